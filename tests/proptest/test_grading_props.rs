//! Property-based tests for grading and answer collection

use kubequiz::config::Config;
use kubequiz::exam::ScriptedInput;
use kubequiz::models::QuestionBank;
use kubequiz::{ExamRunner, Grader, Session};
use proptest::prelude::*;

fn offline_config() -> Config {
    let mut config = Config::default();
    config.checker.enabled = false;
    config.history.enabled = false;
    config
}

proptest! {
    #[test]
    fn test_report_partitions_checklist(
        number in 1u32..=17,
        answer in prop::collection::vec("[a-z0-9 =:/.-]{0,40}", 0..6),
    ) {
        let bank = QuestionBank::builtin().unwrap();
        let q = bank.get(number).unwrap();
        let report = Grader::default().grade_lines(q, &answer);
        prop_assert_eq!(report.found.len() + report.missing.len(), q.checklist.len());
        for item in &q.checklist {
            prop_assert!(report.found.contains(item) != report.missing.contains(item));
        }
    }

    #[test]
    fn test_reference_passes_with_extra_lines(
        number in 1u32..=17,
        extra in prop::collection::vec("echo [a-z]{1,10}", 0..4),
    ) {
        let bank = QuestionBank::builtin().unwrap();
        let q = bank.get(number).unwrap();
        let mut answer = extra.clone();
        answer.extend(q.reference_lines());
        let report = Grader::default().grade_lines(q, &answer);
        prop_assert!(report.passed(), "missing {:?}", report.missing);
    }

    #[test]
    fn test_reference_passes_in_any_order(number in 1u32..=17, seed in any::<u64>()) {
        let bank = QuestionBank::builtin().unwrap();
        let q = bank.get(number).unwrap();
        let mut answer = q.reference_lines();
        let len = answer.len();
        if len > 1 {
            answer.rotate_left((seed as usize) % len);
        }
        prop_assert!(Grader::default().grade_lines(q, &answer).passed());
    }

    #[test]
    fn test_blank_line_terminates_answer(
        lines in prop::collection::vec("[a-z][a-z0-9 =-]{0,30}[a-z0-9]", 0..6),
        blank in "[ \t]{0,4}",
    ) {
        let mut script = lines.clone();
        script.push(blank);
        script.push("kubectl get pods".to_string());

        let mut input = ScriptedInput::new(script);
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let summary = runtime.block_on(async {
            let session = Session::open(offline_config(), QuestionBank::builtin().unwrap()).unwrap();
            let mut out = Vec::new();
            ExamRunner::new(session, &mut input, &mut out).run(&[8]).await.unwrap()
        });

        prop_assert_eq!(summary.answered, 1);
        prop_assert_eq!(input.remaining(), 1);
    }
}
