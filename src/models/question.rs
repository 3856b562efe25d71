//! Question Model
//!
//! A question is static exam content: the prompt shown to the user, the
//! reference answer, the checklist the grader looks for and optional mock
//! output rules for commands that need a pipe or filter to be useful.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commands;
use crate::error::{Error, Result};

/// Built-in CKA-style question bank
const BUILTIN_BANK: &str = include_str!("../../assets/questions.toml");

/// Canned output shown when an answer runs a command without its filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockRule {
    /// Substring that must appear in the answer
    pub trigger: String,
    /// Substring whose absence triggers the mock
    pub unless: String,
    /// Text shown to the user
    pub output: String,
}

impl MockRule {
    /// Whether this rule fires for the given (already lowercased) answer text
    pub fn applies_to(&self, answer_lower: &str) -> bool {
        answer_lower.contains(&self.trigger.to_lowercase())
            && !answer_lower.contains(&self.unless.to_lowercase())
    }
}

/// A single exam question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question number as displayed
    pub number: u32,
    /// Prompt text
    pub prompt: String,
    /// Reference answer, one command or YAML line per row
    pub reference: String,
    /// Required keywords and flags
    pub checklist: Vec<String>,
    /// Extra remarks shown after grading
    #[serde(default)]
    pub notes: Vec<String>,
    /// Mock output rules for piped/filtered commands
    #[serde(default)]
    pub mocks: Vec<MockRule>,
}

impl Question {
    /// First line of the prompt, used for listings
    pub fn title(&self) -> &str {
        self.prompt.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
    }

    /// Logical lines of the reference answer
    ///
    /// Backslash continuations are joined, blank rows and `#` comment rows
    /// are dropped.
    pub fn reference_lines(&self) -> Vec<String> {
        let rows: Vec<String> = self
            .reference
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        commands::join_continuations(&rows)
    }

    /// Check the question invariants
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidQuestion {
                number: self.number,
                reason: "prompt is empty".to_string(),
            });
        }
        if self.reference.trim().is_empty() {
            return Err(Error::InvalidQuestion {
                number: self.number,
                reason: "reference answer is empty".to_string(),
            });
        }
        if self.checklist.is_empty() || self.checklist.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::InvalidQuestion {
                number: self.number,
                reason: "checklist is empty or has a blank item".to_string(),
            });
        }
        Ok(())
    }
}

/// Ordered, validated collection of questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from questions, validating every invariant
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        let bank = Self { questions };
        bank.validate()?;
        Ok(bank)
    }

    /// The bank compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_BANK)
    }

    /// Parse a TOML bank
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let bank: QuestionBank =
            toml::from_str(content).map_err(|e| Error::QuestionBankParseFailed {
                format: "TOML".to_string(),
                reason: e.to_string(),
            })?;
        bank.validate()?;
        Ok(bank)
    }

    /// Parse a JSON bank
    pub fn from_json_str(content: &str) -> Result<Self> {
        let bank: QuestionBank =
            serde_json::from_str(content).map_err(|e| Error::QuestionBankParseFailed {
                format: "JSON".to_string(),
                reason: e.to_string(),
            })?;
        bank.validate()?;
        Ok(bank)
    }

    /// Load a bank file, format chosen by extension (TOML unless `.json`)
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(Error::QuestionBankParseFailed {
                format: "bank".to_string(),
                reason: "no questions defined".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for question in &self.questions {
            question.validate()?;
            if !seen.insert(question.number) {
                return Err(Error::InvalidQuestion {
                    number: question.number,
                    reason: "duplicate question number".to_string(),
                });
            }
        }
        Ok(())
    }

    /// All questions in bank order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Look up a question by its number
    pub fn get(&self, number: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }

    /// Questions for the given numbers, in the requested order; all when empty
    pub fn select(&self, numbers: &[u32]) -> Result<Vec<&Question>> {
        if numbers.is_empty() {
            return Ok(self.questions.iter().collect());
        }
        numbers
            .iter()
            .map(|&number| self.get(number).ok_or(Error::QuestionNotFound { number }))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
