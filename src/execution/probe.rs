//! Probe planning
//!
//! Decides which argv to run for a typed line so that the real tool parses
//! the flags without changing any state.

use crate::commands;
use crate::config::{CheckerConfig, ProbeMode};

/// A non-mutating invocation of a recognized CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// Binary name as typed
    pub binary: String,
    /// Arguments passed to the binary
    pub args: Vec<String>,
    pub mode: ProbeMode,
}

/// Values `--dry-run` accepts as a separate word
const DRY_RUN_VALUES: &[&str] = &["none", "client", "server", "unchanged", "true", "false"];

/// bash long options that consume the next word
const BASH_LONG_VALUE_OPTIONS: &[&str] = &["--rcfile", "--init-file"];

impl Probe {
    /// Build the probe for a line, `None` when the binary is not recognized
    pub fn plan(line: &str, config: &CheckerConfig) -> Option<Self> {
        let words = commands::first_segment(&commands::canonicalize_kubectl(line));
        let start = commands::command_start(&words)?;
        let binary = words[start].clone();
        let mode = config.probe_mode(&binary)?;
        let typed: Vec<String> = words[start + 1..].to_vec();

        let args = match mode {
            ProbeMode::DryRun => dry_run_args(typed, &config.dry_run_verbs),
            ProbeMode::Help => with_help(typed),
            ProbeMode::SyntaxOnly => syntax_only_args(&typed),
        };

        Some(Self { binary, args, mode })
    }

    /// Help passthrough for a line that asks for help, `None` otherwise
    ///
    /// Arguments after the help flag are dropped. A shell only ever gets a
    /// bare `--help`, and only when the flag is among its leading options.
    pub fn help(line: &str, config: &CheckerConfig) -> Option<Self> {
        let words = commands::first_segment(&commands::canonicalize_kubectl(line));
        let start = commands::command_start(&words)?;
        let at = commands::help_flag_position(&words)?;
        let binary = words[start].clone();
        let mode = config.probe_mode(&binary)?;

        let args = match mode {
            ProbeMode::SyntaxOnly => {
                let leading_options = words[start + 1..at]
                    .iter()
                    .all(|w| w.starts_with('-') || w.starts_with('+'));
                if !leading_options {
                    return None;
                }
                vec!["--help".to_string()]
            }
            ProbeMode::DryRun | ProbeMode::Help => words[start + 1..=at].to_vec(),
        };

        Some(Self { binary, args, mode })
    }

    /// Full argv for display
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.binary.clone()).chain(self.args.iter().cloned()).collect()
    }
}

/// Verb position: first word that is neither a flag nor a flag's value
fn verb_index(args: &[String]) -> Option<usize> {
    let mut idx = 0;
    while let Some(arg) = args.get(idx) {
        if arg == "--" {
            return None;
        }
        if !arg.starts_with('-') {
            return Some(idx);
        }
        idx += if commands::flag_takes_value(arg) { 2 } else { 1 };
    }
    None
}

/// `--help` before any `--` separator, so it is parsed as a flag
fn with_help(mut args: Vec<String>) -> Vec<String> {
    if args.iter().any(|a| a == "--help") {
        return args;
    }
    let at = args.iter().position(|a| a == "--").unwrap_or(args.len());
    args.insert(at, "--help".to_string());
    args
}

/// Drop every typed `--dry-run` so only the inserted client mode applies
fn strip_dry_run(args: Vec<String>) -> Vec<String> {
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = args.into_iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            kept.push(arg);
            kept.extend(iter);
            break;
        }
        if arg == "--dry-run" {
            iter.next_if(|value| DRY_RUN_VALUES.contains(&value.as_str()));
            continue;
        }
        if arg.starts_with("--dry-run=") {
            continue;
        }
        kept.push(arg);
    }
    kept
}

fn dry_run_args(args: Vec<String>, dry_run_verbs: &[String]) -> Vec<String> {
    let mut args = strip_dry_run(args);
    let verb = match verb_index(&args) {
        Some(idx) if dry_run_verbs.iter().any(|v| *v == args[idx]) => idx,
        _ => return with_help(args),
    };

    args.insert(verb + 1, "--dry-run=client".to_string());
    let has_output = args
        .iter()
        .take_while(|a| a.as_str() != "--")
        .any(|a| a == "--output" || a.starts_with("--output=") || a.starts_with("-o"));
    if !has_output {
        args.insert(verb + 2, "-o".to_string());
        args.insert(verb + 3, "yaml".to_string());
    }
    args
}

/// `bash -n` over the command string or script alone
///
/// Typed shell options are not passed on, since `+n`, `-i` or `+o noexec`
/// would turn execution back on. `--posix` and `-O`/`+O` shopt settings
/// change how the text parses and are kept.
fn syntax_only_args(typed: &[String]) -> Vec<String> {
    let mut long_options = Vec::new();
    let mut shopts = Vec::new();
    let mut command_mode = false;
    let mut program = None;
    let mut iter = typed.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" || arg == "-" {
            program = iter.next();
            break;
        }
        if arg.starts_with("--") {
            if arg == "--posix" {
                long_options.push(arg.clone());
            } else if BASH_LONG_VALUE_OPTIONS.contains(&arg.as_str()) {
                iter.next();
            }
            continue;
        }
        let (sign, letters) = match (arg.strip_prefix('-'), arg.strip_prefix('+')) {
            (Some(letters), _) if !letters.is_empty() => ('-', letters),
            (_, Some(letters)) if !letters.is_empty() => ('+', letters),
            _ => {
                program = Some(arg);
                break;
            }
        };
        for letter in letters.chars() {
            match letter {
                'c' if sign == '-' => command_mode = true,
                'o' => {
                    iter.next();
                }
                'O' => {
                    if let Some(name) = iter.next() {
                        shopts.push(format!("{}O", sign));
                        shopts.push(name.clone());
                    }
                }
                _ => {}
            }
        }
    }

    let mut args = long_options;
    args.push("-n".to_string());
    args.extend(shopts);
    if command_mode {
        args.push("-c".to_string());
    }
    args.extend(program.cloned());
    args
}
