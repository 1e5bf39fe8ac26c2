//! Fuzz test for the CloudScript parser
//!
//! Feeds arbitrary UTF-8 through lexer and parser, then checks that every
//! accepted program survives a pretty-print round trip.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use cloudscript_dsl::{parse, parse_with_config, pretty_print, ParserConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        match parse(input) {
            Ok(program) => {
                let printed = pretty_print(&program);
                let reparsed = parse(&printed).expect("canonical output should parse");
                assert_eq!(program, reparsed, "Round trip should preserve the tree");
            }
            Err(err) => {
                assert!(err.line() >= 1, "Error line should be >= 1");
                assert!(err.column() >= 1, "Error column should be >= 1");
                assert!(!err.to_string().is_empty(), "Error message should not be empty");
            }
        }

        // Strict policies may reject more, but must never panic
        let _ = parse_with_config(input, &ParserConfig::strict());
    }
});
