//! Core data models for kubequiz
//!
//! Questions are static content loaded at start, answers live for one
//! question, and check results are produced per typed line.

pub mod answer;
pub mod check_result;
pub mod question;

// Re-exports for convenience
pub use answer::Answer;
pub use check_result::{CheckOutcome, CheckResult, EnvironmentIssue};
pub use question::{MockRule, Question, QuestionBank};
