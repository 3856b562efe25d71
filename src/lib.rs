//! kubequiz - an interactive Kubernetes administration quiz
//!
//! Questions are answered by typing real commands. Each command is checked
//! against the actual CLI (`kubectl`, `kubeadm`, `apt-get`, `systemctl`,
//! `bash`) in a mode that cannot change anything, and the whole answer is
//! graded against the question's checklist.
//!
//! ## Module Organization
//!
//! - [`config`] - Configuration loading and validation
//! - [`models`] - Questions, answers and check results
//! - [`commands`] - Tokenizing and normalizing command lines
//! - [`execution`] - Syntax checking through probe processes
//! - [`grader`] - Checklist matching
//! - [`history`] - Persistent line history
//! - [`session`] - Per-run state
//! - [`exam`] - The interactive question loop
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use kubequiz::{exam::ScriptedInput, ExamRunner, Session};
//!
//! # async fn run() -> kubequiz::Result<()> {
//! let (config, bank) = kubequiz::init(None)?;
//! let session = Session::open(config, bank)?;
//! let input = ScriptedInput::new(["kubectl scale deploy loadbalancer --replicas=6", ""]);
//! let summary = ExamRunner::new(session, input, std::io::stdout()).run(&[8]).await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod commands;
pub mod config;
pub mod error;
pub mod exam;
pub mod execution;
pub mod grader;
pub mod history;
pub mod models;
pub mod session;

use std::path::Path;

// Re-exports for core functionality
pub use config::loader::ConfigLoader;
pub use config::Config;
pub use error::{Error, Result};
pub use exam::ExamRunner;
pub use execution::SyntaxChecker;
pub use grader::{GradeReport, Grader};
pub use history::HistoryManager;
pub use models::{Answer, CheckOutcome, CheckResult, Question, QuestionBank};
pub use session::{Session, SessionSummary};

/// The current version of kubequiz from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load the configuration and the question bank it selects
///
/// `config_path` takes precedence over `KUBEQUIZ_CONFIG` and the default
/// search locations.
pub fn init(config_path: Option<&Path>) -> Result<(Config, QuestionBank)> {
    info!("Initializing {} v{}", NAME, VERSION);

    let (config, source) = ConfigLoader::load(config_path)?;
    match &source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => debug!("Using default configuration"),
    }

    let bank = load_bank(&config)?;
    Ok((config, bank))
}

/// The configured question bank, or the built-in one
pub fn load_bank(config: &Config) -> Result<QuestionBank> {
    match &config.exam.bank {
        Some(path) => {
            debug!("Loading question bank from {}", path.display());
            QuestionBank::load(path)
        }
        None => QuestionBank::builtin(),
    }
}
