//! Common test utilities for mq-selector-parser integration tests.

use mq_selector_parser::{parse, ParseError, SpannedExpr};

/// Parse input and assert it succeeds, returning the AST.
#[allow(dead_code)]
pub fn assert_parses(input: &str) -> SpannedExpr {
    parse(input).unwrap_or_else(|e| panic!("failed to parse '{}': {}", input, e))
}

/// Parse input and assert it fails, returning the error.
#[allow(dead_code)]
pub fn assert_parse_error(input: &str) -> ParseError {
    match parse(input) {
        Ok(ast) => panic!("expected parse error for '{}', but got: {:?}", input, ast),
        Err(e) => e,
    }
}
