//! Answer grading
//!
//! Compares the typed answer against a question's checklist. Both sides go
//! through the same normalization (`k` shorthand, resource aliases, flag
//! spelling, case, whitespace), so an item can be written in whichever form
//! reads best in the question bank.

use std::collections::BTreeSet;
use std::fmt;

use crate::commands::{self, NormalizedCommand};
use crate::config::CheckerConfig;
use crate::models::{Answer, Question};

/// Placeholder binary used to parse bare flag items
const FLAG_HOLDER: &str = "kubequiz-flags";

/// How a checklist item is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistItem {
    /// Some answer command starts with these positionals and carries these flags
    Command(NormalizedCommand),
    /// Some answer command carries all of these flags
    Flags(Vec<String>),
    /// Substring of the normalized answer text
    Text(String),
}

/// Outcome of grading one answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeReport {
    /// Checklist items the answer satisfied, in checklist order
    pub found: Vec<String>,
    /// Checklist items the answer did not satisfy, in checklist order
    pub missing: Vec<String>,
    /// Mock outputs triggered by the answer
    pub mocks: Vec<String>,
}

impl GradeReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }

    /// Missing items, one per line, or `None` when nothing is missing
    pub fn hint(&self) -> Option<String> {
        if self.missing.is_empty() {
            return None;
        }
        let mut hint = String::from("Missing from your answer:");
        for item in &self.missing {
            hint.push_str("\n  - ");
            hint.push_str(item);
        }
        Some(hint)
    }

    pub fn total(&self) -> usize {
        self.found.len() + self.missing.len()
    }
}

impl fmt::Display for GradeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} checklist items found", self.found.len(), self.total())
    }
}

/// Normalized view of an answer, built once per grading
struct AnswerView {
    text: String,
    commands: Vec<NormalizedCommand>,
}

impl AnswerView {
    fn new(lines: &[String]) -> Self {
        let canonical: Vec<String> = lines.iter().map(|l| commands::canonicalize_kubectl(l)).collect();
        let text = commands::normalize_text(&canonical.join("\n"));
        let commands = canonical
            .iter()
            .flat_map(|line| NormalizedCommand::from_line(line))
            .collect();
        Self { text, commands }
    }
}

/// Grades answers against checklists
#[derive(Debug, Clone)]
pub struct Grader {
    /// Binaries whose checklist items are matched structurally
    recognized: BTreeSet<String>,
}

impl Grader {
    pub fn new<I, S>(recognized: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recognized: recognized.into_iter().map(Into::into).collect(),
        }
    }

    /// Recognize the binaries the syntax checker probes
    pub fn from_config(config: &CheckerConfig) -> Self {
        Self::new(config.probes.keys().cloned())
    }

    /// Decide how a checklist item is matched
    pub fn classify(&self, item: &str) -> ChecklistItem {
        let item = commands::canonicalize_kubectl(item.trim());
        let words = commands::first_segment(&item);

        if let Some(command) = NormalizedCommand::from_words(&words) {
            if self.recognized.contains(&command.binary) {
                return ChecklistItem::Command(command);
            }
        }

        if words.first().is_some_and(|w| w.starts_with("--") || is_short_flag(w)) {
            let mut holder = vec![FLAG_HOLDER.to_string()];
            holder.extend(words);
            if let Some(parsed) = NormalizedCommand::from_words(&holder) {
                if parsed.positionals.len() == 1 && !parsed.flags.is_empty() {
                    return ChecklistItem::Flags(parsed.flags);
                }
            }
        }

        ChecklistItem::Text(commands::normalize_text(&item))
    }

    /// Grade a typed answer
    pub fn grade(&self, question: &Question, answer: &Answer) -> GradeReport {
        self.grade_lines(question, answer.lines())
    }

    /// Grade raw answer lines
    pub fn grade_lines(&self, question: &Question, lines: &[String]) -> GradeReport {
        let view = AnswerView::new(lines);
        let mut report = GradeReport::default();

        for item in &question.checklist {
            if self.item_satisfied(item, &view) {
                report.found.push(item.clone());
            } else {
                report.missing.push(item.clone());
            }
        }

        report.mocks = question
            .mocks
            .iter()
            .filter(|rule| rule.applies_to(&view.text))
            .map(|rule| rule.output.trim_end().to_string())
            .collect();

        debug!(
            "Question {}: {} found, {} missing, {} mocks",
            question.number,
            report.found.len(),
            report.missing.len(),
            report.mocks.len()
        );
        report
    }

    fn item_satisfied(&self, item: &str, view: &AnswerView) -> bool {
        let plain = commands::normalize_text(&commands::canonicalize_kubectl(item));
        if contains_words(&view.text, &plain) {
            return true;
        }

        match self.classify(item) {
            ChecklistItem::Command(required) => view.commands.iter().any(|c| c.satisfies(&required)),
            ChecklistItem::Flags(flags) => view
                .commands
                .iter()
                .any(|c| flags.iter().all(|flag| c.has_flag(flag))),
            ChecklistItem::Text(text) => view.text.contains(&text),
        }
    }
}

impl Default for Grader {
    fn default() -> Self {
        Self::from_config(&CheckerConfig::default())
    }
}

/// Whether `needle` occurs in `haystack` starting and ending on a word boundary
///
/// `--replicas=6` is not found in `--replicas=60`.
fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + needle.len()..].chars().next();
        before.map_or(true, is_boundary) && after.map_or(true, is_boundary)
    })
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\'' | '"' | '|' | ';' | '&' | '(' | ')' | '<' | '>')
}

/// `-n`, `-l`: a dash followed by letters, unlike a YAML `- item`
fn is_short_flag(word: &str) -> bool {
    word.len() > 1
        && word.starts_with('-')
        && word[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}
