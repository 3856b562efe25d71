//! Line input for the exam loop
//!
//! The loop reads through [`LineSource`] so the interactive editor and
//! scripted input (tests, piped answers) behave the same way.

use std::collections::VecDeque;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::Result;

/// Source of typed lines
pub trait LineSource {
    /// Read one line; `Ok(None)` on end of input or interrupt
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Make a submitted line available for recall
    fn remember(&mut self, _line: &str) {}
}

/// Interactive input with arrow-key history
pub struct ReadlineSource {
    editor: DefaultEditor,
}

impl ReadlineSource {
    /// Create an editor seeded with previous entries, oldest first
    pub fn new<I, S>(history: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut editor = DefaultEditor::new()?;
        for entry in history {
            let _ = editor.add_history_entry(entry.as_ref());
        }
        Ok(Self { editor })
    }
}

impl LineSource for ReadlineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn remember(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// Pre-recorded input, ending like EOF once exhausted
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
    remembered: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            remembered: Vec::new(),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines passed to [`LineSource::remember`]
    pub fn remembered(&self) -> &[String] {
        &self.remembered
    }

    /// Lines not consumed yet
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn remember(&mut self, line: &str) {
        self.remembered.push(line.to_string());
    }
}

impl<L: LineSource + ?Sized> LineSource for &mut L {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        (**self).read_line(prompt)
    }

    fn remember(&mut self, line: &str) {
        (**self).remember(line)
    }
}
