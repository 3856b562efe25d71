//! Configuration management for kubequiz
//!
//! Settings for the syntax checker (timeouts, probe modes, binary lookup),
//! the history file and the exam flow. Every section falls back to its
//! defaults, so a config file only needs the keys it changes.

pub mod loader;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default syntax-check deadline
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Default deadline for `--help` passthrough
pub const DEFAULT_HELP_TIMEOUT_MS: u64 = 10_000;

/// Default number of history rows kept
pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 10_000;

/// Main configuration structure for kubequiz
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Syntax checker configuration
    pub checker: CheckerConfig,

    /// History file configuration
    pub history: HistoryConfig,

    /// Exam flow configuration
    pub exam: ExamConfig,
}

/// How a recognized binary is probed without changing system state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeMode {
    /// `--dry-run=client -o yaml` for configured verbs, `--help` otherwise
    DryRun,
    /// Append `--help`
    Help,
    /// Insert `-n` (parse without executing)
    SyntaxOnly,
}

/// Syntax checker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Whether typed commands are probed at all
    pub enabled: bool,

    /// Deadline for a syntax probe in milliseconds
    pub timeout_ms: u64,

    /// Deadline for a `--help` passthrough in milliseconds
    pub help_timeout_ms: u64,

    /// kubectl verbs that accept `--dry-run=client`
    pub dry_run_verbs: Vec<String>,

    /// Directory searched for binaries before PATH
    pub bin_dir: Option<PathBuf>,

    /// Recognized binaries and how to probe them
    pub probes: BTreeMap<String, ProbeMode>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        let probes = [
            ("kubectl", ProbeMode::DryRun),
            ("kubeadm", ProbeMode::Help),
            ("apt-get", ProbeMode::Help),
            ("systemctl", ProbeMode::Help),
            ("bash", ProbeMode::SyntaxOnly),
        ]
        .into_iter()
        .map(|(bin, mode)| (bin.to_string(), mode))
        .collect();

        Self {
            enabled: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            help_timeout_ms: DEFAULT_HELP_TIMEOUT_MS,
            dry_run_verbs: vec!["create".to_string(), "run".to_string()],
            bin_dir: None,
            probes,
        }
    }
}

impl CheckerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn help_timeout(&self) -> Duration {
        Duration::from_millis(self.help_timeout_ms)
    }

    /// Probe mode for a binary, `None` if it is not recognized
    pub fn probe_mode(&self, binary: &str) -> Option<ProbeMode> {
        self.probes.get(binary).copied()
    }
}

/// History file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Whether typed lines are persisted
    pub enabled: bool,

    /// History file location (defaults to `~/.kubequiz_history`)
    pub path: Option<PathBuf>,

    /// Maximum number of rows kept
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            max_entries: DEFAULT_MAX_HISTORY_ENTRIES,
        }
    }
}

/// Exam flow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamConfig {
    /// External question bank (TOML or JSON) replacing the built-in one
    pub bank: Option<PathBuf>,

    /// Print the reference answer after grading
    pub show_reference: bool,

    /// Print the question notes after grading
    pub show_notes: bool,

    /// Offer to re-enter a line that failed the syntax check
    pub allow_retry: bool,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            bank: None,
            show_reference: true,
            show_notes: true,
            allow_retry: true,
        }
    }
}

impl Config {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.checker.timeout_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "checker.timeout_ms".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.checker.timeout_ms > 60_000 {
            return Err(Error::ConfigValidationFailed {
                field: "checker.timeout_ms".to_string(),
                reason: "Timeout cannot exceed 60 seconds".to_string(),
            });
        }

        if self.checker.help_timeout_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "checker.help_timeout_ms".to_string(),
                reason: "Help timeout must be greater than 0".to_string(),
            });
        }

        if self.checker.probes.keys().any(|bin| bin.trim().is_empty()) {
            return Err(Error::ConfigValidationFailed {
                field: "checker.probes".to_string(),
                reason: "Binary names cannot be empty".to_string(),
            });
        }

        if self.history.max_entries == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "history.max_entries".to_string(),
                reason: "History size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
