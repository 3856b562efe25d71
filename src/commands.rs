//! Command parsing and normalization utilities
//!
//! This module turns a typed line into tokens and pipeline segments, finds
//! the binary being invoked, canonicalizes the `k` shorthand, and builds the
//! normalized form the grader compares against checklist items.

use once_cell::sync::Lazy;
use regex::Regex;

/// CLIs whose `-h` means help
const SHORT_HELP_BINARIES: &[&str] = &["kubectl", "kubeadm", "apt-get", "systemctl"];

/// Long flags that take a value, so `--flag value` can be folded into `--flag=value`
const VALUE_FLAGS: &[&str] = &[
    "namespace",
    "selector",
    "output",
    "replicas",
    "name",
    "port",
    "target-port",
    "type",
    "image",
    "verb",
    "resource",
    "clusterrole",
    "role",
    "serviceaccount",
    "user",
    "group",
    "filename",
    "container",
    "labels",
    "protocol",
    "schedule",
    "restart",
    "overrides",
    "context",
    "cluster",
    "kubeconfig",
    "server",
    "token",
    "as",
    "request-timeout",
];

/// Short value flags and their long names
const SHORT_VALUE_FLAGS: &[(&str, &str)] = &[
    ("-n", "namespace"),
    ("-l", "selector"),
    ("-o", "output"),
    ("-f", "filename"),
    ("-c", "container"),
];

/// kubectl resource short names and plurals, mapped to one canonical singular
const RESOURCE_ALIASES: &[(&str, &str)] = &[
    ("po", "pod"),
    ("pods", "pod"),
    ("no", "node"),
    ("nodes", "node"),
    ("ns", "namespace"),
    ("namespaces", "namespace"),
    ("svc", "service"),
    ("services", "service"),
    ("deploy", "deployment"),
    ("deployments", "deployment"),
    ("rs", "replicaset"),
    ("replicasets", "replicaset"),
    ("sts", "statefulset"),
    ("statefulsets", "statefulset"),
    ("ds", "daemonset"),
    ("daemonsets", "daemonset"),
    ("sa", "serviceaccount"),
    ("serviceaccounts", "serviceaccount"),
    ("cm", "configmap"),
    ("configmaps", "configmap"),
    ("secrets", "secret"),
    ("pv", "persistentvolume"),
    ("persistentvolumes", "persistentvolume"),
    ("pvc", "persistentvolumeclaim"),
    ("persistentvolumeclaims", "persistentvolumeclaim"),
    ("sc", "storageclass"),
    ("storageclasses", "storageclass"),
    ("ing", "ingress"),
    ("ingresses", "ingress"),
    ("netpol", "networkpolicy"),
    ("networkpolicies", "networkpolicy"),
    ("cj", "cronjob"),
    ("cronjobs", "cronjob"),
    ("jobs", "job"),
    ("ep", "endpoints"),
    ("clusterroles", "clusterrole"),
    ("roles", "role"),
    ("clusterrolebindings", "clusterrolebinding"),
    ("rolebindings", "rolebinding"),
    ("hpa", "horizontalpodautoscaler"),
    ("horizontalpodautoscalers", "horizontalpodautoscaler"),
];

/// Standalone `k` in command position (line start, after an operator or `sudo`)
static K_ALIAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^\s*(?:sudo\s+)?|[|;&]\s*(?:sudo\s+)?)k(\s|$)").expect("valid k alias regex")
});

/// `NAME=value` environment assignment prefix
static ENV_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=").expect("valid env assignment regex"));

/// A lexical token of a command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word with quotes and escapes removed
    Word(String),
    /// An unquoted shell operator: `|`, `||`, `&`, `&&`, `;`, `>`, `>>`, `<`
    Operator(String),
}

/// Split a line into words and operators
///
/// Whitespace separates words. Single and double quotes group text and are
/// removed, a backslash escapes the next character outside single quotes.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    fn flush(tokens: &mut Vec<Token>, current: &mut String, quoted: &mut bool) {
        if !current.is_empty() || *quoted {
            tokens.push(Token::Word(std::mem::take(current)));
        }
        *quoted = false;
    }

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                quoted = true;
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    current.push(inner);
                }
            }
            '"' => {
                quoted = true;
                while let Some(inner) = chars.next() {
                    match inner {
                        '"' => break,
                        '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        _ => current.push(inner),
                    }
                }
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '|' | '&' | '>' => {
                flush(&mut tokens, &mut current, &mut quoted);
                let mut op = c.to_string();
                if chars.peek() == Some(&c) {
                    chars.next();
                    op.push(c);
                }
                tokens.push(Token::Operator(op));
            }
            ';' | '<' => {
                flush(&mut tokens, &mut current, &mut quoted);
                tokens.push(Token::Operator(c.to_string()));
            }
            c if c.is_whitespace() => flush(&mut tokens, &mut current, &mut quoted),
            c => current.push(c),
        }
    }
    flush(&mut tokens, &mut current, &mut quoted);
    tokens
}

/// Split a line into the words of each command in its pipeline/list
///
/// Redirection targets are dropped rather than treated as commands.
pub fn segments(line: &str) -> Vec<Vec<String>> {
    let mut result = Vec::new();
    let mut current = Vec::new();
    let mut skip_target = false;

    for token in tokenize(line) {
        match token {
            Token::Word(word) => {
                if skip_target {
                    skip_target = false;
                } else {
                    current.push(word);
                }
            }
            Token::Operator(op) => match op.as_str() {
                ">" | ">>" | "<" => skip_target = true,
                _ => {
                    if !current.is_empty() {
                        result.push(std::mem::take(&mut current));
                    }
                }
            },
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Words of the first command on the line
pub fn first_segment(line: &str) -> Vec<String> {
    segments(line).into_iter().next().unwrap_or_default()
}

/// Index of the binary within a segment, skipping `NAME=value` and `sudo [-opts]`
pub fn command_start(words: &[String]) -> Option<usize> {
    let mut idx = 0;
    while idx < words.len() && ENV_ASSIGNMENT.is_match(&words[idx]) {
        idx += 1;
    }
    if words.get(idx).map(String::as_str) == Some("sudo") {
        idx += 1;
        while idx < words.len() && words[idx].starts_with('-') {
            idx += 1;
        }
    }
    (idx < words.len()).then_some(idx)
}

/// The binary a segment invokes
pub fn binary(words: &[String]) -> Option<&str> {
    command_start(words).map(|idx| words[idx].as_str())
}

/// Replace a standalone `k` in command position with `kubectl`
pub fn canonicalize_kubectl(line: &str) -> String {
    let mut current = line.to_string();
    // Replacements can overlap at a shared separator, so repeat to a fixpoint
    loop {
        let next = K_ALIAS.replace_all(&current, "${1}kubectl${2}").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Joins rows ending with a backslash into logical lines, one row at a time
#[derive(Debug, Default)]
pub struct LineJoiner {
    pending: Option<String>,
}

impl LineJoiner {
    /// Feed a row; returns a logical line once it is complete
    pub fn push(&mut self, row: &str) -> Option<String> {
        let row = row.trim();
        let (body, continues) = match row.strip_suffix('\\') {
            Some(body) => (body.trim_end(), true),
            None => (row, false),
        };
        let line = match self.pending.take() {
            Some(mut prefix) => {
                if !body.is_empty() {
                    if !prefix.is_empty() {
                        prefix.push(' ');
                    }
                    prefix.push_str(body);
                }
                prefix
            }
            None => body.to_string(),
        };
        if continues {
            self.pending = Some(line);
            None
        } else {
            Some(line).filter(|line| !line.is_empty())
        }
    }

    /// Whether a continued line is waiting for more rows
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take whatever was continued but never completed
    pub fn finish(&mut self) -> Option<String> {
        self.pending.take().filter(|line| !line.is_empty())
    }
}

/// Join rows ending with a backslash to the following row
pub fn join_continuations(rows: &[String]) -> Vec<String> {
    let mut joiner = LineJoiner::default();
    let mut joined: Vec<String> = rows.iter().filter_map(|row| joiner.push(row)).collect();
    joined.extend(joiner.finish());
    joined
}

/// Whether a flag written without `=` consumes the next word
pub fn flag_takes_value(flag: &str) -> bool {
    match flag.strip_prefix("--") {
        Some(long) => VALUE_FLAGS.contains(&long),
        None => SHORT_VALUE_FLAGS.iter().any(|(short, _)| *short == flag),
    }
}

/// Index of the help flag in a segment
///
/// Words after a `--` separator belong to another program and never count.
pub fn help_flag_position(words: &[String]) -> Option<usize> {
    let start = command_start(words)?;
    let short_help = SHORT_HELP_BINARIES.contains(&words[start].as_str());
    words[start + 1..]
        .iter()
        .take_while(|w| w.as_str() != "--")
        .position(|w| w == "--help" || (short_help && w == "-h"))
        .map(|pos| start + 1 + pos)
}

/// Whether the line asks a tool for its help text
pub fn is_help_request(line: &str) -> bool {
    help_flag_position(&first_segment(line)).is_some()
}

/// Collapse whitespace and lowercase, for substring comparison
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}

/// Canonical singular for a kubectl resource name, if it is an alias
pub fn resource_alias(name: &str) -> Option<&'static str> {
    RESOURCE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
}

fn canonical_resource(word: &str) -> String {
    // `deploy/web` style references keep their name part
    match word.split_once('/') {
        Some((kind, name)) => match resource_alias(kind) {
            Some(canonical) => format!("{}/{}", canonical, name),
            None => word.to_string(),
        },
        None => resource_alias(word).map(str::to_string).unwrap_or_else(|| word.to_string()),
    }
}

/// A command reduced to comparable parts
///
/// Everything is lowercased, positional words keep their order, flags are
/// folded to `--long=value` where the flag is known to take a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCommand {
    pub binary: String,
    /// Positional words starting with the binary
    pub positionals: Vec<String>,
    pub flags: Vec<String>,
}

impl NormalizedCommand {
    /// Normalize the words of one segment; `None` if there is no binary
    pub fn from_words(words: &[String]) -> Option<Self> {
        let start = command_start(words)?;
        let words: Vec<String> = words[start..].iter().map(|w| w.to_lowercase()).collect();
        let binary = if words[0] == "k" { "kubectl".to_string() } else { words[0].clone() };

        let mut positionals = vec![binary.clone()];
        let mut flags = Vec::new();
        let mut iter = words.iter().skip(1).peekable();

        while let Some(word) = iter.next() {
            if let Some(long) = word.strip_prefix("--") {
                if long.contains('=') || !VALUE_FLAGS.contains(&long) {
                    flags.push(word.clone());
                } else {
                    match iter.next_if(|next| !next.starts_with('-')) {
                        Some(value) => flags.push(format!("--{}={}", long, value)),
                        None => flags.push(word.clone()),
                    }
                }
            } else if word.starts_with('-') && word.len() > 1 {
                let long = SHORT_VALUE_FLAGS
                    .iter()
                    .find(|(short, _)| short == word)
                    .map(|(_, long)| *long);
                match long {
                    Some(long) => match iter.next_if(|next| !next.starts_with('-')) {
                        Some(value) => flags.push(format!("--{}={}", long, value)),
                        None => flags.push(word.clone()),
                    },
                    None => flags.push(word.clone()),
                }
            } else {
                positionals.push(word.clone());
            }
        }

        // kubectl <verb> <resource>: the resource slot accepts aliases
        if binary == "kubectl" && positionals.len() > 2 {
            positionals[2] = canonical_resource(&positionals[2]);
        }

        Some(Self { binary, positionals, flags })
    }

    /// Normalize a whole line, one entry per pipeline/list segment
    pub fn from_line(line: &str) -> Vec<Self> {
        segments(line).iter().filter_map(|words| Self::from_words(words)).collect()
    }

    /// Whether this command satisfies `required`
    ///
    /// Same binary, `required`'s positionals are a prefix of ours, and every
    /// required flag is present in any order.
    pub fn satisfies(&self, required: &NormalizedCommand) -> bool {
        self.binary == required.binary
            && self.positionals.starts_with(&required.positionals)
            && required.flags.iter().all(|flag| self.flags.contains(flag))
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}
