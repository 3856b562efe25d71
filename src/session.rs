//! Quiz session state
//!
//! A [`Session`] owns everything that lives for one run of the quiz: the
//! configuration, the question bank, the history file and the bookkeeping
//! the exam loop needs (which environment problems were already reported,
//! per-question results). It is opened before the first question and closed
//! after the last one.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::config::Config;
use crate::error::Result;
use crate::history::HistoryManager;
use crate::models::QuestionBank;

/// Result of one graded question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub number: u32,
    pub passed: bool,
    /// Checklist items found
    pub found: usize,
    /// Checklist size
    pub total: usize,
    /// Lines that failed the syntax check
    pub syntax_failures: usize,
}

/// Totals reported when a session closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub answered: usize,
    pub passed: usize,
    pub syntax_failures: usize,
    pub duration: Duration,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} questions passed", self.passed, self.answered)
    }
}

/// State of one quiz run
pub struct Session {
    config: Config,
    bank: QuestionBank,
    history: Option<HistoryManager>,
    /// Binaries whose environment problem was already shown
    reported_environment: HashSet<String>,
    results: Vec<QuestionResult>,
    started_at: DateTime<Local>,
}

impl Session {
    /// Start a session, loading the history file when enabled
    ///
    /// A history file that cannot be opened disables history for this run
    /// instead of failing.
    pub fn open(config: Config, bank: QuestionBank) -> Result<Self> {
        config.validate()?;

        let history = if config.history.enabled {
            let path = match &config.history.path {
                Some(path) => Some(path.clone()),
                None => HistoryManager::default_history_path()
                    .map_err(|e| warn!("History disabled: {}", e))
                    .ok(),
            };
            path.and_then(|path| {
                HistoryManager::open(path.clone(), config.history.max_entries)
                    .map_err(|e| warn!("History disabled, cannot open {}: {}", path.display(), e))
                    .ok()
            })
        } else {
            None
        };

        info!(
            "Session started with {} questions, history {}",
            bank.len(),
            if history.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            config,
            bank,
            history,
            reported_environment: HashSet::new(),
            results: Vec::new(),
            started_at: Local::now(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn history(&self) -> Option<&HistoryManager> {
        self.history.as_ref()
    }

    /// Recall entries for seeding a line editor, oldest first
    pub fn recall_entries(&self) -> Vec<String> {
        self.history
            .as_ref()
            .map(|h| h.entries().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Persist a submitted line
    pub fn record_line(&mut self, line: &str) -> Result<bool> {
        match self.history.as_mut() {
            Some(history) => history.add(line),
            None => Ok(false),
        }
    }

    /// Note an environment problem; `true` the first time a binary reports one
    pub fn note_environment(&mut self, binary: &str) -> bool {
        self.reported_environment.insert(binary.to_string())
    }

    pub fn record_result(&mut self, result: QuestionResult) {
        debug!(
            "Question {} graded: {} ({}/{})",
            result.number,
            if result.passed { "pass" } else { "fail" },
            result.found,
            result.total
        );
        self.results.push(result);
    }

    /// Close the session: compact history and return the totals
    pub fn close(mut self) -> Result<SessionSummary> {
        if let Some(history) = self.history.as_mut() {
            history.compact()?;
        }

        let summary = SessionSummary {
            answered: self.results.len(),
            passed: self.results.iter().filter(|r| r.passed).count(),
            syntax_failures: self.results.iter().map(|r| r.syntax_failures).sum(),
            duration: (Local::now() - self.started_at).to_std().unwrap_or_default(),
        };
        info!("Session closed: {}", summary);
        Ok(summary)
    }
}
