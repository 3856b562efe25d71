//! Syntax checking by direct process execution
//!
//! Typed commands are never run as typed. A [`Probe`] rewrites the line into
//! a non-mutating invocation, which is spawned directly (no shell) in its own
//! process group under a deadline. The captured exit code and output are then
//! classified into a [`CheckOutcome`].

pub mod probe;

pub use probe::Probe;

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::CheckerConfig;
use crate::error::{Error, Result};
use crate::models::{CheckOutcome, CheckResult, EnvironmentIssue};

/// Usage errors printed by cobra, getopt, systemd and bash
static USAGE_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(unknown (shorthand )?flag|unknown command|unrecognized (option|command|argument)|invalid option|invalid argument|flag needs an argument|required flag|command line option .* not understood|syntax error|unexpected end of file|accepts? (at most |at least |between )?\d+ arg)",
    )
    .expect("valid usage error regex")
});

/// Messages meaning the tool parsed fine but had no cluster to talk to
static CLUSTER_UNREACHABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(connection refused|connection to the server \S+ was refused|unable to connect to the server|no configuration has been provided|couldn't get current server api group list|dial tcp)",
    )
    .expect("valid cluster unreachable regex")
});

/// Captured output of a finished process
#[derive(Debug, Clone, Default)]
struct Captured {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

/// How a deadline-bounded run ended
#[derive(Debug)]
enum RunEnd {
    Finished(Captured),
    TimedOut,
    NotFound(io::Error),
    Failed(io::Error),
}

/// Output of a `--help` passthrough
#[derive(Debug, Clone)]
pub struct HelpOutput {
    /// Argv that was run
    pub command: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

/// Checks typed commands against the real CLI tools
pub struct SyntaxChecker {
    config: CheckerConfig,
}

impl SyntaxChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Probe a line and classify the result
    ///
    /// Never fails: every problem becomes a [`CheckOutcome`].
    pub async fn check(&self, line: &str) -> CheckResult {
        if !self.config.enabled {
            return CheckResult::skipped(line);
        }
        let probe = match Probe::plan(line, &self.config) {
            Some(probe) => probe,
            None => {
                trace!("No recognized CLI in '{}', skipping", line);
                return CheckResult::skipped(line);
            }
        };

        let argv = probe.argv();
        let limit = self.config.timeout();
        debug!("Probing '{}' as: {}", line, argv.join(" "));

        let started = Instant::now();
        let end = self.run(&probe.binary, &probe.args, limit).await;
        let elapsed = started.elapsed();

        let outcome = match end {
            RunEnd::Finished(captured) => classify(&probe.binary, &captured),
            RunEnd::TimedOut => {
                warn!("Probe for '{}' exceeded {:?}", line, limit);
                CheckOutcome::TimedOut { limit }
            }
            RunEnd::NotFound(e) => CheckOutcome::Environment {
                binary: probe.binary.clone(),
                issue: EnvironmentIssue::MissingBinary,
                detail: format!("{} not found: {}", probe.binary, e),
            },
            RunEnd::Failed(e) => CheckOutcome::Environment {
                binary: probe.binary.clone(),
                issue: EnvironmentIssue::MissingBinary,
                detail: format!("could not run {}: {}", probe.binary, e),
            },
        };

        debug!("Probe finished in {:?}: {:?}", elapsed, outcome);
        CheckResult::new(line, argv, outcome, elapsed)
    }

    /// Whether the line asks a recognized CLI for its help text
    pub fn is_help_request(&self, line: &str) -> bool {
        Probe::help(line, &self.config).is_some()
    }

    /// Show a tool's help text for a help request
    ///
    /// Only the tool and the words up to its help flag are run.
    pub async fn run_help(&self, line: &str) -> Result<HelpOutput> {
        let probe = Probe::help(line, &self.config).ok_or_else(|| Error::NotAHelpRequest {
            command: line.to_string(),
        })?;
        let command = probe.argv();

        debug!("Help passthrough: {}", command.join(" "));
        match self.run(&probe.binary, &probe.args, self.config.help_timeout()).await {
            RunEnd::Finished(captured) => Ok(HelpOutput {
                command,
                stdout: captured.stdout,
                stderr: captured.stderr,
                exit_code: captured.exit_code,
                timed_out: false,
            }),
            RunEnd::TimedOut => Ok(HelpOutput {
                command,
                stdout: String::new(),
                stderr: String::new(),
                exit_code: None,
                timed_out: true,
            }),
            RunEnd::NotFound(e) | RunEnd::Failed(e) => Err(Error::CommandSpawnFailed {
                command: probe.binary,
                reason: e.to_string(),
            }),
        }
    }

    /// Configured bin dir first, then PATH
    fn resolve(&self, binary: &str) -> PathBuf {
        if let Some(dir) = &self.config.bin_dir {
            let candidate = dir.join(binary);
            if candidate.is_file() {
                return candidate;
            }
        }
        PathBuf::from(binary)
    }

    async fn run(&self, binary: &str, args: &[String], limit: Duration) -> RunEnd {
        let program = self.resolve(binary);

        let mut std_command = std::process::Command::new(&program);
        std_command
            .args(args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_command.process_group(0);
        }
        let mut command = Command::from(std_command);
        command.kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return RunEnd::NotFound(e),
            Err(e) => return RunEnd::Failed(e),
        };
        let pid = child.id();

        match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => RunEnd::Finished(Captured {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            }),
            Ok(Err(e)) => RunEnd::Failed(e),
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                RunEnd::TimedOut
            }
        }
    }
}

/// SIGKILL the whole group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        // Group may already be gone
        debug!("killpg({}) failed: {}", pid, e);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

fn classify(binary: &str, captured: &Captured) -> CheckOutcome {
    let usage_error = USAGE_ERROR.is_match(&captured.stderr);

    if captured.exit_code == Some(0) && !usage_error {
        return CheckOutcome::Passed;
    }

    if !usage_error && CLUSTER_UNREACHABLE.is_match(&captured.stderr) {
        return CheckOutcome::Environment {
            binary: binary.to_string(),
            issue: EnvironmentIssue::ClusterUnreachable,
            detail: captured.stderr.trim().to_string(),
        };
    }

    CheckOutcome::SyntaxError {
        stderr: error_text(captured),
        exit_code: captured.exit_code,
    }
}

/// Stderr, then stdout, then the exit status; never empty
fn error_text(captured: &Captured) -> String {
    let stderr = captured.stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = captured.stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    match captured.exit_code {
        Some(code) => format!("exited with code {}", code),
        None => "terminated by a signal".to_string(),
    }
}
