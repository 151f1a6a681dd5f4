//! Evaluation error types.

/// An error that occurred during selector evaluation.
///
/// Unknown values are not errors; they evaluate to [`super::Value::Null`].
/// An `EvalError` means the selector and the message disagree about types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    /// The error message.
    pub message: String,
    /// The kind of error.
    pub kind: EvalErrorKind,
}

/// The kind of evaluation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// An operator was applied to an operand type it does not accept.
    UnsupportedType,
    /// A value could not be represented in its promoted kind.
    Overflow,
}

impl EvalError {
    /// Create a new error with the given kind and message.
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Create an unsupported type error for a binary operator.
    pub fn unsupported_types(op: &str, left: &str, right: &str) -> Self {
        Self::new(
            EvalErrorKind::UnsupportedType,
            format!("unsupported operand types for '{}': {} and {}", op, left, right),
        )
    }

    /// Create an overflow error.
    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Overflow, message)
    }
}
