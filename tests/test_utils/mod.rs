//! Shared test helpers
//!
//! Fake `kubectl`, `kubeadm`, `apt-get` and `systemctl` scripts in a temp
//! directory, wired in through `checker.bin_dir`. They accept everything
//! except a few trigger flags:
//!
//! - `--bogus*` prints `error: unknown flag` and exits 1
//! - `--slow` sleeps 30 seconds
//! - `--unreachable` prints kubectl's connection refused message and exits 1
//! - `--silent-fail` exits 3 without output
//!
//! `--help` prints a usage line and exits 0.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use kubequiz::config::{CheckerConfig, Config};
use kubequiz::models::{Question, QuestionBank};
use kubequiz::Session;
use tempfile::TempDir;

/// Binaries the fake tool directory provides
pub const FAKE_TOOLS: &[&str] = &["kubectl", "kubeadm", "apt-get", "systemctl"];

fn fake_script(name: &str) -> String {
    format!(
        r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --bogus*) echo "error: unknown flag: $arg" >&2; exit 1 ;;
    --slow) sleep 30 ;;
    --unreachable) echo "The connection to the server localhost:8080 was refused - did you specify the right host or port?" >&2; exit 1 ;;
    --silent-fail) exit 3 ;;
  esac
done
for arg in "$@"; do
  if [ "$arg" = "--help" ]; then
    echo "Usage: {name} [flags]"
    exit 0
  fi
done
echo "apiVersion: v1"
"#
    )
}

/// A temp directory of fake CLI tools
pub struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create fake tool dir");
        for name in FAKE_TOOLS {
            let path = dir.path().join(name);
            fs::write(&path, fake_script(name)).expect("write fake tool");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
        }
        Self { dir }
    }

    pub fn bin_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Checker settings using the fake tools
    pub fn checker(&self, timeout_ms: u64) -> CheckerConfig {
        CheckerConfig {
            timeout_ms,
            bin_dir: Some(self.bin_dir().to_path_buf()),
            ..CheckerConfig::default()
        }
    }

    /// Full configuration using the fake tools, history off
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.checker = self.checker(2_000);
        config.history.enabled = false;
        config
    }
}

/// Configuration with history written to `history`
pub fn config_with_history(tools: &FakeTools, history: PathBuf) -> Config {
    let mut config = tools.config();
    config.history.enabled = true;
    config.history.path = Some(history);
    config
}

/// Session over the built-in bank
pub fn builtin_session(config: Config) -> Session {
    Session::open(config, QuestionBank::builtin().expect("builtin bank")).expect("open session")
}

pub fn lines(rows: &[&str]) -> Vec<String> {
    rows.iter().map(|s| s.to_string()).collect()
}

/// A minimal question for grading tests
pub fn question(number: u32, checklist: &[&str]) -> Question {
    Question {
        number,
        prompt: format!("Question {}", number),
        reference: checklist.join("\n"),
        checklist: lines(checklist),
        notes: vec![],
        mocks: vec![],
    }
}
