//! Integration Tests for the Exam Loop
//!
//! Full question runs with scripted input and fake CLI tools.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::fs;

use kubequiz::config::ProbeMode;
use kubequiz::exam::ScriptedInput;
use kubequiz::ExamRunner;
use tempfile::TempDir;
use test_utils::{builtin_session, config_with_history, FakeTools};

const RETRY_PROMPT: &str = "Would you like to re-enter this command? (y/n) ";

#[tokio::test]
async fn test_retry_yes_drops_the_line() {
    let tools = FakeTools::new();
    let mut input = ScriptedInput::new([
        "kubectl scale deploy loadbalancer --replicas=6 --bogus",
        "y",
        "kubectl scale deploy loadbalancer --replicas=6",
        "",
    ]);
    let mut out = Vec::new();

    let summary = ExamRunner::new(builtin_session(tools.config()), &mut input, &mut out)
        .run(&[8])
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("error: unknown flag: --bogus"));
    assert!(!text.contains("  kubectl scale deploy loadbalancer --replicas=6 --bogus"));
    assert!(input.prompts().iter().any(|p| p == RETRY_PROMPT));
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.syntax_failures, 1);
}

#[tokio::test]
async fn test_retry_no_keeps_the_line() {
    let tools = FakeTools::new();
    let input = ScriptedInput::new(["kubectl scale deploy loadbalancer --replicas=6 --bogus", "n", ""]);
    let mut out = Vec::new();

    let summary = ExamRunner::new(builtin_session(tools.config()), input, &mut out)
        .run(&[8])
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("  kubectl scale deploy loadbalancer --replicas=6 --bogus"));
    assert_eq!(summary.passed, 1);
}

#[tokio::test]
async fn test_retry_disabled_keeps_line_without_asking() {
    let tools = FakeTools::new();
    let mut config = tools.config();
    config.exam.allow_retry = false;
    let mut input = ScriptedInput::new(["kubectl get pods --bogus", ""]);
    let mut out = Vec::new();

    ExamRunner::new(builtin_session(config), &mut input, &mut out)
        .run(&[8])
        .await
        .unwrap();

    assert!(!input.prompts().iter().any(|p| p == RETRY_PROMPT));
    assert_eq!(input.remaining(), 0);
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let tools = FakeTools::new();
    let mut config = tools.config();
    config.checker.timeout_ms = 300;
    let input = ScriptedInput::new(["kubectl get nodes --slow", "n", ""]);
    let mut out = Vec::new();

    ExamRunner::new(builtin_session(config), input, &mut out)
        .run(&[10])
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Command took too long (over 300 ms)"));
}

#[tokio::test]
async fn test_help_lines_are_not_graded() {
    let tools = FakeTools::new();
    let input = ScriptedInput::new([
        "k scale --help",
        "kubectl scale deploy loadbalancer --replicas=6",
        "",
    ]);
    let mut out = Vec::new();

    ExamRunner::new(builtin_session(tools.config()), input, &mut out)
        .run(&[8])
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Usage: kubectl [flags]"));
    assert!(!text.contains("  kubectl scale --help"));
    assert!(text.contains("PASS"));
}

#[tokio::test]
async fn test_environment_problem_reported_once() {
    let tools = FakeTools::new();
    let mut config = tools.config();
    config
        .checker
        .probes
        .insert("kubequiz-missing-tool".to_string(), ProbeMode::Help);
    let input = ScriptedInput::new(["kubequiz-missing-tool one", "kubequiz-missing-tool two", ""]);
    let mut out = Vec::new();

    ExamRunner::new(builtin_session(config), input, &mut out)
        .run(&[17])
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Could not check kubequiz-missing-tool").count(), 1);
    assert!(text.contains("  kubequiz-missing-tool one"));
    assert!(text.contains("  kubequiz-missing-tool two"));
}

#[tokio::test]
async fn test_failed_question_shows_hint_and_reference() {
    let tools = FakeTools::new();
    let input = ScriptedInput::new(["kubectl cordon ek8s-node-1", ""]);
    let mut out = Vec::new();

    let summary = ExamRunner::new(builtin_session(tools.config()), input, &mut out)
        .run(&[2])
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("FAIL: 1/5 checklist items found"));
    assert!(text.contains("  - kubectl drain ek8s-node-1"));
    assert!(text.contains("Reference answer:"));
    assert_eq!(summary.to_string(), "0/1 questions passed");
}

#[tokio::test]
async fn test_reference_hidden_when_disabled() {
    let tools = FakeTools::new();
    let mut config = tools.config();
    config.exam.show_reference = false;
    config.exam.show_notes = false;
    let input = ScriptedInput::new(["kubectl get nodes | grep -i ready", ""]);
    let mut out = Vec::new();

    ExamRunner::new(builtin_session(config), input, &mut out)
        .run(&[10])
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("Reference answer:"));
    assert!(!text.contains("Notes:"));
}

#[tokio::test]
async fn test_lines_written_to_history() {
    let tools = FakeTools::new();
    let dir = TempDir::new().unwrap();
    let history = dir.path().join("history");
    let input = ScriptedInput::new([
        "kubectl scale --help",
        "kubectl get pods --bogus",
        "y",
        "",
        "kubectl scale deploy loadbalancer --replicas=6",
        "",
    ]);
    let mut out = Vec::new();

    let config = config_with_history(&tools, history.clone());
    ExamRunner::new(builtin_session(config), input, &mut out)
        .run(&[2, 8])
        .await
        .unwrap();

    let content = fs::read_to_string(&history).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            "kubectl scale --help",
            "kubectl get pods --bogus",
            "kubectl scale deploy loadbalancer --replicas=6",
        ]
    );
}

#[tokio::test]
async fn test_unknown_question_number_is_an_error() {
    let tools = FakeTools::new();
    let input = ScriptedInput::new([""]);
    let mut out = Vec::new();

    let result = ExamRunner::new(builtin_session(tools.config()), input, &mut out)
        .run(&[99])
        .await;
    assert!(matches!(result, Err(kubequiz::Error::QuestionNotFound { number: 99 })));
}
