//! Error types and Result aliases for kubequiz

use std::path::PathBuf;

/// Result type alias for kubequiz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kubequiz
///
/// Per-line checker failures (syntax errors, timeouts, missing binaries) are
/// not errors: they are reported through [`crate::models::CheckOutcome`] so
/// the exam loop can keep going. This type covers the cases that stop an
/// operation outright.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // === Command errors ===
    /// Failed to spawn a probe or help command
    #[error("Failed to spawn command '{command}': {reason}")]
    CommandSpawnFailed { command: String, reason: String },

    /// Line does not ask a recognized CLI for help
    #[error("'{command}' is not a help request")]
    NotAHelpRequest { command: String },

    // === Configuration errors ===
    /// Failed to load configuration file
    #[error("Failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Failed to parse configuration
    #[error("Failed to parse {format} config: {reason}")]
    ConfigParseFailed { format: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    // === Question bank errors ===
    /// A question in the bank violates an invariant
    #[error("Question {number} is invalid: {reason}")]
    InvalidQuestion { number: u32, reason: String },

    /// Question bank could not be parsed
    #[error("Failed to parse {format} question bank: {reason}")]
    QuestionBankParseFailed { format: String, reason: String },

    /// Requested question number does not exist
    #[error("Question {number} not found in the bank")]
    QuestionNotFound { number: u32 },

    // === History errors ===
    /// No usable location for the history file
    #[error("Could not determine a history file location")]
    HistoryPathUnavailable,

    // === Line editor errors ===
    /// Line editor failed for a reason other than EOF/interrupt
    #[error("Line editor error: {0}")]
    Readline(String),

    // === I/O and serialization errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    // === Generic fallback (use sparingly) ===
    #[error("Error: {0}")]
    Other(String),
}

impl From<rustyline::error::ReadlineError> for Error {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        Error::Readline(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
