//! Exam loop
//!
//! Shows each question, collects the answer line by line, syntax-checks the
//! commands as they are typed, then grades the whole answer and shows the
//! reference. A blank line ends an answer; end of input ends the exam after
//! grading what was typed so far.

pub mod input;

pub use input::{LineSource, ReadlineSource, ScriptedInput};

use std::io::Write;

use crate::commands::{self, LineJoiner};
use crate::error::Result;
use crate::execution::SyntaxChecker;
use crate::grader::{GradeReport, Grader};
use crate::models::{Answer, CheckOutcome, Question};
use crate::session::{QuestionResult, Session, SessionSummary};

const ANSWER_PROMPT: &str = "> ";
const CONTINUATION_PROMPT: &str = "... ";
const RETRY_PROMPT: &str = "Would you like to re-enter this command? (y/n) ";

/// Drives a session through the selected questions
pub struct ExamRunner<L: LineSource, W: Write> {
    session: Session,
    checker: SyntaxChecker,
    grader: Grader,
    input: L,
    out: W,
    /// Input reached EOF or was interrupted
    input_closed: bool,
}

impl<L: LineSource, W: Write> ExamRunner<L, W> {
    pub fn new(session: Session, input: L, out: W) -> Self {
        let checker = SyntaxChecker::new(session.config().checker.clone());
        let grader = Grader::from_config(&session.config().checker);
        Self {
            session,
            checker,
            grader,
            input,
            out,
            input_closed: false,
        }
    }

    /// Run the given questions (all when empty) and close the session
    pub async fn run(mut self, numbers: &[u32]) -> Result<SessionSummary> {
        let questions: Vec<Question> = self
            .session
            .bank()
            .select(numbers)?
            .into_iter()
            .cloned()
            .collect();
        let total = questions.len();

        writeln!(
            self.out,
            "Answer each question with one command or YAML line per line, then a blank line."
        )?;
        writeln!(self.out, "Lines asking a tool for --help show its help text and are not graded.")?;

        for (idx, question) in questions.iter().enumerate() {
            writeln!(self.out)?;
            writeln!(self.out, "Question {} ({}/{})", question.number, idx + 1, total)?;
            writeln!(self.out, "{}", question.prompt.trim_end())?;
            writeln!(self.out)?;

            let (answer, syntax_failures) = self.collect_answer(question.number).await?;
            let report = self.grader.grade(question, &answer);
            self.render_verdict(question, &answer, &report)?;

            self.session.record_result(QuestionResult {
                number: question.number,
                passed: report.passed(),
                found: report.found.len(),
                total: report.total(),
                syntax_failures,
            });

            if self.input_closed {
                writeln!(self.out, "\nInput closed, ending the exam.")?;
                break;
            }
        }

        let summary = self.session.close()?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", summary)?;
        self.out.flush()?;
        Ok(summary)
    }

    /// Read lines until a blank line or end of input
    async fn collect_answer(&mut self, number: u32) -> Result<(Answer, usize)> {
        let mut answer = Answer::new(number);
        let mut syntax_failures = 0;
        let mut joiner = LineJoiner::default();

        loop {
            let prompt = if joiner.is_pending() { CONTINUATION_PROMPT } else { ANSWER_PROMPT };
            let raw = match self.input.read_line(prompt)? {
                Some(raw) => raw,
                None => {
                    self.input_closed = true;
                    if let Some(line) = joiner.finish() {
                        syntax_failures += self.submit_line(&line, &mut answer).await?;
                    }
                    break;
                }
            };

            if raw.trim().is_empty() {
                if let Some(line) = joiner.finish() {
                    syntax_failures += self.submit_line(&line, &mut answer).await?;
                }
                break;
            }

            if let Some(line) = joiner.push(&raw) {
                syntax_failures += self.submit_line(&line, &mut answer).await?;
            }
            if self.input_closed {
                break;
            }
        }

        Ok((answer, syntax_failures))
    }

    /// Handle one logical line; returns how many syntax failures it produced
    async fn submit_line(&mut self, line: &str, answer: &mut Answer) -> Result<usize> {
        let line = commands::canonicalize_kubectl(line.trim());
        if line.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.session.record_line(&line) {
            warn!("Could not write history: {}", e);
        }
        self.input.remember(&line);

        if self.checker.is_help_request(&line) {
            self.show_help(&line).await?;
            return Ok(0);
        }

        let result = self.checker.check(&line).await;
        match &result.outcome {
            CheckOutcome::Passed | CheckOutcome::Skipped => {}
            CheckOutcome::Environment { binary, detail, .. } => {
                if self.session.note_environment(binary) {
                    writeln!(self.out, "Could not check {} here, accepting the line as typed:", binary)?;
                    writeln!(self.out, "  {}", detail)?;
                }
            }
            CheckOutcome::SyntaxError { stderr, .. } => {
                writeln!(self.out, "Syntax check failed:")?;
                writeln!(self.out, "{}", stderr)?;
            }
            CheckOutcome::TimedOut { limit } => {
                writeln!(
                    self.out,
                    "Command took too long (over {} ms) and was stopped.",
                    limit.as_millis()
                )?;
            }
        }
        if !result.needs_attention() {
            answer.push(line);
            return Ok(0);
        }

        if !self.session.config().exam.allow_retry {
            answer.push(line);
            return Ok(1);
        }

        match self.input.read_line(RETRY_PROMPT)? {
            Some(reply) if reply.trim().eq_ignore_ascii_case("y") => {
                writeln!(self.out, "Line dropped, type the corrected command.")?;
            }
            Some(_) => answer.push(line),
            None => {
                self.input_closed = true;
                answer.push(line);
            }
        }
        Ok(1)
    }

    async fn show_help(&mut self, line: &str) -> Result<()> {
        match self.checker.run_help(line).await {
            Ok(help) if help.timed_out => {
                writeln!(self.out, "Help for '{}' took too long and was stopped.", help.command.join(" "))?;
            }
            Ok(help) => {
                if !help.stdout.trim().is_empty() {
                    writeln!(self.out, "{}", help.stdout.trim_end())?;
                }
                if !help.stderr.trim().is_empty() {
                    writeln!(self.out, "{}", help.stderr.trim_end())?;
                }
                if let Some(code) = help.exit_code.filter(|code| *code != 0) {
                    writeln!(self.out, "(exit code {})", code)?;
                }
            }
            Err(e) => writeln!(self.out, "Could not run help: {}", e)?,
        }
        Ok(())
    }

    fn render_verdict(&mut self, question: &Question, answer: &Answer, report: &GradeReport) -> Result<()> {
        writeln!(self.out)?;
        if answer.is_empty() {
            writeln!(self.out, "No answer entered.")?;
        } else {
            writeln!(self.out, "Your answer:")?;
            for line in answer.lines() {
                writeln!(self.out, "  {}", line)?;
            }
        }

        writeln!(self.out)?;
        if report.passed() {
            writeln!(self.out, "PASS: {}", report)?;
        } else {
            writeln!(self.out, "FAIL: {}", report)?;
            if let Some(hint) = report.hint() {
                writeln!(self.out, "{}", hint)?;
            }
        }

        for mock in &report.mocks {
            writeln!(self.out)?;
            writeln!(self.out, "{}", mock)?;
        }

        let exam = &self.session.config().exam;
        if exam.show_reference {
            writeln!(self.out)?;
            writeln!(self.out, "Reference answer:")?;
            for row in question.reference.trim().lines() {
                writeln!(self.out, "  {}", row)?;
            }
        }
        if exam.show_notes && !question.notes.is_empty() {
            writeln!(self.out)?;
            writeln!(self.out, "Notes:")?;
            for note in &question.notes {
                writeln!(self.out, "  - {}", note)?;
            }
        }
        Ok(())
    }
}
