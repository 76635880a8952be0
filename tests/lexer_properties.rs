//! Property-based tests for the lexer and parser
//!
//! These tests check invariants that must hold for any input:
//! - Scanning terminates with exactly one `End` token
//! - Each token ends where the scan context stopped
//! - Token spans tile the source apart from skipped whitespace
//! - Parsing never panics and always returns a unit

use proptest::prelude::*;
use rpgcode::parser::lexer::Lexer;
use rpgcode::parser::{lexer::lookup_keyword, parse, TokenKind};

/// Generate RPGCode-looking fragments mixed with arbitrary text
fn source_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        // Words, sigils and keywords
        "[a-zA-Z_#][a-zA-Z0-9_]{0,8}[$!]?",
        // Numbers
        "[0-9]{1,4}(\\.[0-9]{0,3})?",
        // Operators and punctuation
        prop::sample::select(vec![
            "<<=", ">>=", "<>", "==", "!=", "++", "--", "&&", "||", "`=", "^", "\\", "{", "}",
            "(", ")", "[", "]", ";", ":", ",", "=", "*", "//", "\"",
        ])
        .prop_map(str::to_string),
        // Whitespace and newlines
        "[ \t\r\n]{1,3}",
        // Anything at all
        any::<String>(),
    ];
    prop::collection::vec(fragment, 0..24).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn scan_terminates_with_single_end(source in source_strategy()) {
        let mut lexer = Lexer::new(&source);
        let mut count = 0;
        loop {
            let token = lexer.scan();
            count += 1;
            prop_assert!(count <= source.len() + 1, "too many tokens");
            if token.kind == TokenKind::End {
                break;
            }
        }

        // End is sticky
        prop_assert_eq!(lexer.scan().kind, TokenKind::End);
    }

    #[test]
    fn token_ends_at_context_offset(source in source_strategy()) {
        let mut lexer = Lexer::new(&source);
        loop {
            let token = lexer.scan();
            prop_assert_eq!(token.offset + token.length, lexer.context().offset);
            if token.kind == TokenKind::End {
                prop_assert_eq!(token.length, 0);
                break;
            }
            prop_assert!(token.length > 0);
        }
    }

    #[test]
    fn tokens_tile_source(source in source_strategy()) {
        let tokens = Lexer::new(&source).tokenize();
        let mut cursor = 0;
        for token in &tokens {
            // only whitespace may sit between tokens
            let gap = &source[cursor..token.offset];
            prop_assert!(gap.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | 0x0C)), "gap {:?}", gap);
            let lexeme = token.lexeme(&source);
            prop_assert_eq!(lexeme.len(), token.length);
            cursor = token.offset + token.length;
        }
        prop_assert_eq!(cursor, source.len());
    }

    #[test]
    fn keywords_ignore_case(word in "(?i)(function|class|elseif|resume|method)") {
        prop_assert!(lookup_keyword(&word).is_some());
        prop_assert_eq!(lookup_keyword(&word), lookup_keyword(&word.to_lowercase()));
    }

    #[test]
    fn parse_never_panics(source in source_strategy()) {
        let outcome = parse(&source);
        prop_assert!(outcome.unit.range.end.offset <= source.len());
    }
}
