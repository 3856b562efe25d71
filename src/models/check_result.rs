//! Check Result Model
//!
//! Outcome of syntax-checking one typed line against the real CLI tool.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Why an environment problem kept a check from running to a verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentIssue {
    /// The binary is not on PATH (or in the configured bin dir)
    MissingBinary,
    /// The tool ran but could not reach a cluster
    ClusterUnreachable,
}

/// Classification of a syntax check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// Probe exited cleanly without usage errors
    Passed,
    /// Line does not start with a recognized CLI, nothing was run
    Skipped,
    /// Probe reported a usage error
    SyntaxError {
        /// Captured error text, never empty
        stderr: String,
        exit_code: Option<i32>,
    },
    /// Probe exceeded the deadline and was killed
    TimedOut { limit: Duration },
    /// Probe could not produce a verdict because of the environment
    Environment {
        binary: String,
        issue: EnvironmentIssue,
        detail: String,
    },
}

/// Result of checking one typed command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// The line as typed (after `k` canonicalization)
    pub command: String,
    /// Argv that was actually executed, empty when skipped
    pub probe: Vec<String>,
    pub outcome: CheckOutcome,
    /// Wall time spent in the probe
    pub elapsed: Duration,
    pub checked_at: DateTime<Local>,
}

impl CheckResult {
    pub fn new(command: &str, probe: Vec<String>, outcome: CheckOutcome, elapsed: Duration) -> Self {
        Self {
            command: command.to_string(),
            probe,
            outcome,
            elapsed,
            checked_at: Local::now(),
        }
    }

    /// A line with no recognized CLI
    pub fn skipped(command: &str) -> Self {
        Self::new(command, Vec::new(), CheckOutcome::Skipped, Duration::ZERO)
    }

    /// Whether the line is acceptable as typed
    ///
    /// Environment problems are not the user's fault and count as passing.
    pub fn passed(&self) -> bool {
        matches!(
            self.outcome,
            CheckOutcome::Passed | CheckOutcome::Skipped | CheckOutcome::Environment { .. }
        )
    }

    /// Whether the user should be offered a retry
    pub fn needs_attention(&self) -> bool {
        matches!(
            self.outcome,
            CheckOutcome::SyntaxError { .. } | CheckOutcome::TimedOut { .. }
        )
    }

    /// Captured error text, if any
    pub fn error_text(&self) -> Option<&str> {
        match &self.outcome {
            CheckOutcome::SyntaxError { stderr, .. } => Some(stderr),
            CheckOutcome::Environment { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
