//! Property-based tests for command parsing

use kubequiz::commands::{self, NormalizedCommand, Token};
use kubequiz::config::CheckerConfig;
use kubequiz::execution::Probe;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_tokenize_doesnt_panic(s in "\\PC*") {
        let _ = commands::tokenize(&s);
        let _ = commands::segments(&s);
        let _ = NormalizedCommand::from_line(&s);
    }

    #[test]
    fn test_plain_words_split_on_whitespace(words in prop::collection::vec("[a-z0-9=./-]{1,12}", 1..8)) {
        let line = words.join("  ");
        let tokens: Vec<Token> = commands::tokenize(&line);
        let expected: Vec<Token> = words.iter().cloned().map(Token::Word).collect();
        prop_assert_eq!(tokens, expected);
    }

    #[test]
    fn test_canonicalize_is_idempotent(s in "[ a-z|;&-]{0,40}") {
        let once = commands::canonicalize_kubectl(&s);
        let twice = commands::canonicalize_kubectl(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_k_prefix_becomes_kubectl(rest in "[a-z0-9 -]{0,30}") {
        let line = format!("k {}", rest);
        prop_assert!(commands::canonicalize_kubectl(&line).starts_with("kubectl "));
    }

    #[test]
    fn test_normalize_text_is_idempotent(s in "[ \ta-zA-Z0-9:{}\n-]{0,80}") {
        let once = commands::normalize_text(&s);
        prop_assert_eq!(commands::normalize_text(&once), once);
    }

    #[test]
    fn test_probe_never_drops_typed_words(
        verb in "(get|describe|drain|create|run|scale)",
        args in prop::collection::vec("[a-z0-9][a-z0-9-]{0,9}", 0..5),
    ) {
        let line = format!("kubectl {} {}", verb, args.join(" "));
        let probe = Probe::plan(&line, &CheckerConfig::default()).unwrap();
        prop_assert_eq!(&probe.binary, "kubectl");
        for word in std::iter::once(&verb).chain(args.iter()) {
            prop_assert!(probe.args.contains(word));
        }
        let safe = probe.args.iter().any(|a| a == "--help" || a.starts_with("--dry-run"));
        prop_assert!(safe);
    }
}
