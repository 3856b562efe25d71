//! Answer Model
//!
//! The lines a user typed for one question. Created when the question is
//! shown and discarded once it has been graded.

use chrono::{DateTime, Local};

/// Ordered command lines typed for a single question
#[derive(Debug, Clone)]
pub struct Answer {
    /// Number of the question being answered
    pub question: u32,
    /// Accepted lines in the order they were typed
    lines: Vec<String>,
    /// When answer collection started
    pub started_at: DateTime<Local>,
}

impl Answer {
    pub fn new(question: u32) -> Self {
        Self {
            question,
            lines: Vec::new(),
            started_at: Local::now(),
        }
    }

    /// Build an answer from existing lines
    pub fn from_lines<I, S>(question: u32, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut answer = Self::new(question);
        for line in lines {
            answer.push(line);
        }
        answer
    }

    /// Accept a line; blank lines are ignored
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            self.lines.push(trimmed.to_string());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Lines joined with newlines
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}
