//! Message selector parser.
//!
//! Turns selector text such as `JMSType = 'car' AND weight > 2500` into a
//! spanned syntax tree. Keywords are case-insensitive, identifiers are not.
//! Parsing stops at the first lexical or syntactic error.

pub mod ast;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, Span, Spanned, SpannedExpr, UnaryOp};

/// Why a selector was rejected, and the byte range that triggered it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse a complete selector.
///
/// Blank input, unknown characters and tokens left over after a full
/// expression are all errors.
pub fn parse(input: &str) -> Result<SpannedExpr, ParseError> {
    let tokens = lexer::lex(input)?;
    parser::parse_tokens(&tokens)
}
