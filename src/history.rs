//! Persistent command history management
//!
//! Every submitted answer line is appended to a plain-text file as soon as
//! it is typed, so the file grows by exactly one row per line. The in-memory
//! recall list keeps only the latest occurrence of each command and seeds the
//! line editor for arrow-key navigation and reverse search.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default history file name
const DEFAULT_HISTORY_FILE: &str = ".kubequiz_history";

/// Persistent command history manager
pub struct HistoryManager {
    /// Path to the history file
    history_file: PathBuf,
    /// De-duplicated recall list, oldest first
    history: VecDeque<String>,
    /// Maximum history size
    max_size: usize,
    /// Rows currently in the file
    file_rows: usize,
}

impl HistoryManager {
    /// Open the history file at `path`, creating it when missing
    pub fn open(path: PathBuf, max_size: usize) -> Result<Self> {
        let mut manager = Self {
            history_file: path,
            history: VecDeque::new(),
            max_size: max_size.max(1),
            file_rows: 0,
        };
        manager.load()?;
        Ok(manager)
    }

    /// Get the default history file path
    pub fn default_history_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_HISTORY_FILE))
            .ok_or(Error::HistoryPathUnavailable)
    }

    /// Load history from file
    pub fn load(&mut self) -> Result<()> {
        if !self.history_file.exists() {
            if let Some(parent) = self.history_file.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&self.history_file)?;
            self.history.clear();
            self.file_rows = 0;
            return Ok(());
        }

        let file = File::open(&self.history_file)?;
        let reader = BufReader::new(file);

        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                rows.push(line);
            }
        }
        self.file_rows = rows.len();

        self.history.clear();
        for row in rows {
            self.remember(row);
        }

        debug!(
            "Loaded {} history entries ({} rows) from {}",
            self.history.len(),
            self.file_rows,
            self.history_file.display()
        );
        Ok(())
    }

    /// Add to the recall list only, keeping the most recent occurrence
    fn remember(&mut self, command: String) {
        self.history.retain(|c| c != &command);
        self.history.push_back(command);
        while self.history.len() > self.max_size {
            self.history.pop_front();
        }
    }

    /// Record a submitted line: append one row to the file and update recall
    ///
    /// Blank lines are ignored. Returns whether a row was written.
    pub fn add(&mut self, command: &str) -> Result<bool> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(false);
        }
        // One row per entry
        let command = command.replace('\n', " ");

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_file)?;
        writeln!(file, "{}", command)?;
        self.file_rows += 1;

        self.remember(command);
        Ok(true)
    }

    /// Rewrite the file with only the newest `max_size` rows, if it outgrew that
    ///
    /// Returns whether the file was rewritten.
    pub fn compact(&mut self) -> Result<bool> {
        if self.file_rows <= self.max_size {
            return Ok(false);
        }

        let content = fs::read_to_string(&self.history_file)?;
        let rows: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        let keep = &rows[rows.len().saturating_sub(self.max_size)..];

        let mut file = File::create(&self.history_file)?;
        for row in keep {
            writeln!(file, "{}", row)?;
        }
        self.file_rows = keep.len();
        info!("Compacted history file to {} rows", self.file_rows);
        Ok(true)
    }

    /// Recall list, oldest first
    pub fn entries(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Rows currently in the history file
    pub fn file_rows(&self) -> usize {
        self.file_rows
    }

    /// Get history file path
    pub fn history_file(&self) -> &Path {
        &self.history_file
    }
}
