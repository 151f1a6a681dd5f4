//! Selector compilation.

use std::fmt;

use mq_selector_parser::{self as parser, SpannedExpr};
use tracing::debug;

use crate::eval::{EvalError, EvaluationContext, Value};
use crate::expr::{BinaryOp, Expression, UnaryOp};

/// Error raised when a selector cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

impl SelectorError {
    fn invalid(selector: &str, message: impl Into<String>) -> Self {
        SelectorError::InvalidSelector {
            selector: selector.to_string(),
            message: message.into(),
        }
    }
}

/// A compiled selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    expression: Expression,
}

impl Selector {
    /// Parse and compile selector text.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let ast =
            parser::parse(source).map_err(|e| SelectorError::invalid(source, e.to_string()))?;

        let expression = build(&ast)
            .map_err(|message| SelectorError::invalid(source, message))?
            .into_boolean();
        debug!(selector = source, expression = %expression, "compiled selector");

        Ok(Self {
            source: source.to_string(),
            expression,
        })
    }

    /// Wrap an already-built expression. The source text is rendered from
    /// the tree and may not re-parse to it exactly when the tree holds
    /// constants with no literal form, such as negative numbers.
    pub fn from_expression(expression: Expression) -> Self {
        let expression = expression.into_boolean();
        Self {
            source: expression.to_string(),
            expression,
        }
    }

    /// The selector text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evaluate against a context. The result is a boolean or null.
    pub fn evaluate(&self, context: &dyn EvaluationContext) -> Result<Value, EvalError> {
        self.expression.evaluate(context)
    }

    /// True only when the selector evaluates to `TRUE`; unknown is no match.
    pub fn matches(&self, context: &dyn EvaluationContext) -> Result<bool, EvalError> {
        Ok(self.evaluate(context)? == Value::Bool(true))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Build an expression tree from the parser's syntax tree.
fn build(ast: &SpannedExpr) -> Result<Expression, String> {
    use parser::Expr;

    Ok(match &ast.node {
        Expr::Null => Expression::Constant(Value::Null),
        Expr::Bool(b) => Expression::constant(*b),
        Expr::Int(n) => Expression::constant(*n),
        Expr::Long(n) => Expression::constant(*n),
        Expr::Double(n) => Expression::constant(*n),
        Expr::String(s) => Expression::constant(s.as_str()),
        Expr::Ident(name) => Expression::property(name),

        Expr::Unary { op, expr } => {
            let operand = build(expr)?;
            match op {
                parser::UnaryOp::Neg => Expression::unary(UnaryOp::Negate, operand),
                parser::UnaryOp::Not => {
                    Expression::unary(UnaryOp::Not, operand.into_boolean())
                }
            }
        }

        Expr::Binary { op, left, right } => {
            let (lhs, rhs) = (build(left)?, build(right)?);
            let op = binary_op(*op);
            if op.is_logical() {
                Expression::binary(op, lhs.into_boolean(), rhs.into_boolean())
            } else {
                Expression::binary(op, lhs, rhs)
            }
        }

        Expr::Like {
            expr,
            pattern,
            escape,
            negated,
        } => Expression::like(build(expr)?, pattern, *escape, *negated)
            .map_err(|e| format!("invalid LIKE pattern '{}': {}", pattern, e))?,

        Expr::In {
            expr,
            values,
            negated,
        } => Expression::in_set(build(expr)?, values, *negated),

        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => {
            let (value, low, high) = (build(expr)?, build(low)?, build(high)?);
            if *negated {
                Expression::not_between(value, low, high)
            } else {
                Expression::between(value, low, high)
            }
        }

        Expr::IsNull { expr, negated } => {
            let op = if *negated {
                UnaryOp::IsNotNull
            } else {
                UnaryOp::IsNull
            };
            Expression::unary(op, build(expr)?)
        }
    })
}

fn binary_op(op: parser::BinaryOp) -> BinaryOp {
    match op {
        parser::BinaryOp::Add => BinaryOp::Plus,
        parser::BinaryOp::Sub => BinaryOp::Minus,
        parser::BinaryOp::Mul => BinaryOp::Multiply,
        parser::BinaryOp::Div => BinaryOp::Divide,
        parser::BinaryOp::Mod => BinaryOp::Mod,
        parser::BinaryOp::Eq => BinaryOp::Equal,
        parser::BinaryOp::Ne => BinaryOp::NotEqual,
        parser::BinaryOp::Lt => BinaryOp::Lesser,
        parser::BinaryOp::Le => BinaryOp::LesserOrEqual,
        parser::BinaryOp::Gt => BinaryOp::Greater,
        parser::BinaryOp::Ge => BinaryOp::GreaterOrEqual,
        parser::BinaryOp::And => BinaryOp::And,
        parser::BinaryOp::Or => BinaryOp::Or,
    }
}
