//! Renders expression trees back to selector text.
//!
//! Every compound node is parenthesized, so a tree produced by
//! [`Selector::parse`](crate::Selector::parse) re-parses to the same tree
//! regardless of operator precedence. `BooleanCast` nodes are implicit in
//! selector syntax and are not written.
//!
//! Hand-built trees can hold constants the grammar has no literal for:
//! negative numbers, narrow integer or `Float32` kinds, and non-finite
//! floats. Those render as their closest literal text and do not re-parse
//! to an identical tree.

use std::fmt::{self, Write};

use crate::eval::Value;
use crate::expr::{Expression, UnaryOp};

/// Quote a string as a selector literal, doubling embedded quotes.
pub fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn write_constant(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("NULL"),
        Value::Bool(true) => f.write_str("TRUE"),
        Value::Bool(false) => f.write_str("FALSE"),
        Value::String(s) => f.write_str(&encode_string(s)),
        Value::Char16(_) => f.write_str(&encode_string(&value.to_string())),
        Value::Int64(n) => write!(f, "{}L", n),
        Value::Float32(n) => write_float(f, f64::from(*n)),
        Value::Float64(n) => write_float(f, *n),
        other => write!(f, "{}", other),
    }
}

/// Floats always carry a decimal point or exponent so they re-parse as floats.
fn write_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let text = format!("{:?}", n);
    if text.contains(['.', 'e', 'E']) || !n.is_finite() {
        f.write_str(&text)
    } else {
        write!(f, "{}.0", text)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write_constant(f, value),
            Expression::Property(name) => f.write_str(name),
            Expression::Unary { op, operand } => match op {
                UnaryOp::Negate => write!(f, "(- {})", operand),
                UnaryOp::Not => write!(f, "(NOT {})", operand),
                UnaryOp::IsNull => write!(f, "({} IS NULL)", operand),
                UnaryOp::IsNotNull => write!(f, "({} IS NOT NULL)", operand),
                UnaryOp::BooleanCast => write!(f, "{}", operand),
            },
            Expression::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expression::Like {
                operand,
                pattern,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(
                    f,
                    "({} {}LIKE {}",
                    operand,
                    not,
                    encode_string(pattern.pattern())
                )?;
                if let Some(escape) = pattern.escape() {
                    write!(f, " ESCAPE {}", encode_string(&escape.to_string()))?;
                }
                f.write_char(')')
            }
            Expression::In {
                operand,
                set,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "({} {}IN (", operand, not)?;
                for (i, value) in set.values().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&encode_string(value))?;
                }
                f.write_str("))")
            }
        }
    }
}
