//! kubequiz - interactive Kubernetes administration quiz
//!
//! Reads answers from the terminal, checks them against the real CLI tools
//! in a non-mutating mode, and grades them against each question's checklist.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use kubequiz::config::Config;
use kubequiz::exam::ReadlineSource;
use kubequiz::{ConfigLoader, ExamRunner, QuestionBank, Session};

/// Interactive Kubernetes administration quiz
#[derive(Debug, Parser)]
#[command(name = "kubequiz", version, about, long_about = None)]
struct Args {
    /// Configuration file (overrides KUBEQUIZ_CONFIG and the default locations)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Question bank file (TOML or JSON) instead of the built-in one
    #[arg(long, value_name = "PATH")]
    bank: Option<PathBuf>,

    /// Only ask these questions, in this order (repeatable)
    #[arg(short, long = "question", value_name = "N")]
    questions: Vec<u32>,

    /// Syntax check deadline in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// History file location
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Do not read or write the history file
    #[arg(long)]
    no_history: bool,

    /// Accept typed commands without running the syntax check
    #[arg(long)]
    no_syntax_check: bool,

    /// Do not show reference answers after grading
    #[arg(long)]
    no_reference: bool,

    /// List the questions and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging (also KUBEQUIZ_DEBUG=1)
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(bank) = &self.bank {
            config.exam.bank = Some(bank.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.checker.timeout_ms = timeout_ms;
        }
        if let Some(path) = &self.history_file {
            config.history.path = Some(path.clone());
        }
        if self.no_history {
            config.history.enabled = false;
        }
        if self.no_syntax_check {
            config.checker.enabled = false;
        }
        if self.no_reference {
            config.exam.show_reference = false;
        }
    }
}

fn init_logging(debug: bool) {
    let debug = debug
        || env::var("KUBEQUIZ_DEBUG").map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"));
    let log_level = if debug { "debug" } else { "warn" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn list_questions(bank: &QuestionBank) {
    for question in bank.questions() {
        println!("{:>3}  {}", question.number, question.title());
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    info!("Starting {} v{}", kubequiz::NAME, kubequiz::VERSION);

    let (mut config, source) =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = &source {
        debug!("Configuration loaded from {}", path.display());
    }
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let bank = kubequiz::load_bank(&config).context("Failed to load question bank")?;
    if args.list {
        list_questions(&bank);
        return Ok(());
    }
    // Fail on unknown question numbers before the first prompt
    bank.select(&args.questions)?;

    let session = Session::open(config, bank)?;
    let input = ReadlineSource::new(session.recall_entries()).context("Failed to start line editor")?;
    ExamRunner::new(session, input, std::io::stdout())
        .run(&args.questions)
        .await?;

    info!("kubequiz finished");
    Ok(())
}
