//! Property tests for the lexer.
//!
//! Lexing must be total: every input, valid or not, yields a finite token
//! list, and error tokens never swallow whitespace.

use oc_lex::{tokenize, TokenKind};
use proptest::prelude::*;

proptest! {
    #[test]
    fn lexing_is_total(source in ".*") {
        // Must terminate and never panic.
        let _ = tokenize(&source);
    }

    #[test]
    fn error_tokens_contain_no_whitespace(source in ".*") {
        for token in tokenize(&source) {
            if token.kind == TokenKind::Error {
                prop_assert!(token.text.chars().all(|c| !c.is_whitespace()));
                prop_assert!(!token.text.is_empty());
                prop_assert!(token.error.is_some());
            }
        }
    }

    #[test]
    fn token_lines_are_monotone(source in ".*") {
        let lines: Vec<u32> = tokenize(&source).iter().map(|t| t.line).collect();
        prop_assert!(lines.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn tokens_reproduce_non_whitespace_text(source in "[a-z0-9 ():;.,]*") {
        // For symbol-and-identifier input, concatenating token texts
        // reproduces the source with whitespace removed.
        let joined: String = tokenize(&source).iter().map(|t| t.text.as_str()).collect();
        let stripped: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(joined, stripped);
    }
}
