//! Fuzz test for the CloudScript lexer
//!
//! Feeds arbitrary UTF-8 to the lexer looking for panics and non-termination.
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use cloudscript_dsl::{Lexer, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens = Lexer::new(input).tokenize();

        // Exactly one Eof, and it is last
        assert_eq!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof),
            "Last token should always be Eof"
        );
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1,
            "Eof should appear exactly once"
        );

        for token in &tokens {
            assert!(token.span.start <= token.span.end, "Span start should be <= end");
            assert!(token.span.end <= input.len(), "Span should stay inside the source");
            assert!(token.line() >= 1, "Line numbers should be >= 1");
            assert!(token.column() >= 1, "Column numbers should be >= 1");
        }

        // Positions never move backwards
        for pair in tokens.windows(2) {
            assert!(
                (pair[0].line(), pair[0].column()) <= (pair[1].line(), pair[1].column()),
                "Token positions should be non-decreasing"
            );
        }
    }
});
