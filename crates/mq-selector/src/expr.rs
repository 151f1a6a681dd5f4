//! Compiled selector expression tree.
//!
//! Built once from the parser's syntax tree and never mutated afterwards.
//! LIKE patterns and IN sets are compiled at construction, so evaluating a
//! tree only reads it and can happen from several threads at once.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::eval::{EvalError, EvaluationContext, Evaluator, LikePattern, Value};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Negate,
    /// Tri-state logical negation.
    Not,
    IsNull,
    IsNotNull,
    /// Keeps boolean values and maps everything else to null.
    BooleanCast,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,

    // Comparison
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Lesser,
    LesserOrEqual,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// The operator as it is written in selector text.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Lesser => "<",
            BinaryOp::LesserOrEqual => "<=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterOrEqual
                | BinaryOp::Lesser
                | BinaryOp::LesserOrEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Map the outcome of comparing two operands to this operator's result.
    ///
    /// `None` means the comparison itself was unknown: equality stays
    /// unknown, ordering operators answer false. Returns `None` for
    /// non-comparison operators.
    pub fn as_boolean(self, compared: Option<Ordering>) -> Option<bool> {
        match (self, compared) {
            (BinaryOp::Equal, ord) => ord.map(|o| o == Ordering::Equal),
            (BinaryOp::NotEqual, ord) => ord.map(|o| o != Ordering::Equal),
            (BinaryOp::Greater, ord) => Some(ord == Some(Ordering::Greater)),
            (BinaryOp::GreaterOrEqual, ord) => {
                Some(matches!(ord, Some(Ordering::Greater | Ordering::Equal)))
            }
            (BinaryOp::Lesser, ord) => Some(ord == Some(Ordering::Less)),
            (BinaryOp::LesserOrEqual, ord) => {
                Some(matches!(ord, Some(Ordering::Less | Ordering::Equal)))
            }
            _ => None,
        }
    }
}

/// The literal list of an IN predicate, kept in source order for display.
#[derive(Debug, Clone)]
pub struct InSet {
    values: Vec<Arc<str>>,
    lookup: HashSet<Arc<str>>,
}

impl InSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<Arc<str>> = values.into_iter().map(|s| Arc::from(s.as_ref())).collect();
        let lookup = values.iter().cloned().collect();
        Self { values, lookup }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.lookup.contains(value)
    }

    /// The literals in the order they were written.
    pub fn values(&self) -> &[Arc<str>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

impl PartialEq for InSet {
    fn eq(&self, other: &Self) -> bool {
        self.lookup == other.lookup
    }
}

/// A selector expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(Value),
    /// Header alias or application property reference.
    Property(Arc<str>),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Like {
        operand: Box<Expression>,
        pattern: LikePattern,
        negated: bool,
    },
    In {
        operand: Box<Expression>,
        set: InSet,
        negated: bool,
    },
}

impl Expression {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn property(name: impl AsRef<str>) -> Self {
        Expression::Property(Arc::from(name.as_ref()))
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `operand [NOT] LIKE pattern [ESCAPE escape]`
    pub fn like(
        operand: Expression,
        pattern: &str,
        escape: Option<char>,
        negated: bool,
    ) -> Result<Self, regex::Error> {
        Ok(Expression::Like {
            operand: Box::new(operand),
            pattern: LikePattern::new(pattern, escape)?,
            negated,
        })
    }

    /// `operand [NOT] IN (values...)`
    pub fn in_set<I, S>(operand: Expression, values: I, negated: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Expression::In {
            operand: Box::new(operand),
            set: InSet::new(values),
            negated,
        }
    }

    /// `value BETWEEN low AND high`, as `value >= low AND value <= high`.
    pub fn between(value: Expression, low: Expression, high: Expression) -> Self {
        Expression::binary(
            BinaryOp::And,
            Expression::binary(BinaryOp::GreaterOrEqual, value.clone(), low),
            Expression::binary(BinaryOp::LesserOrEqual, value, high),
        )
    }

    /// `value NOT BETWEEN low AND high`, as `value < low OR value > high`.
    pub fn not_between(value: Expression, low: Expression, high: Expression) -> Self {
        Expression::binary(
            BinaryOp::Or,
            Expression::binary(BinaryOp::Lesser, value.clone(), low),
            Expression::binary(BinaryOp::Greater, value, high),
        )
    }

    /// Whether this node always evaluates to a boolean or null.
    pub fn is_boolean(&self) -> bool {
        match self {
            Expression::Constant(v) => matches!(v, Value::Bool(_)),
            Expression::Property(_) => false,
            Expression::Unary { op, .. } => *op != UnaryOp::Negate,
            Expression::Binary { op, .. } => op.is_comparison() || op.is_logical(),
            Expression::Like { .. } | Expression::In { .. } => true,
        }
    }

    /// Wrap in `BooleanCast` unless already boolean-producing.
    pub fn into_boolean(self) -> Self {
        if self.is_boolean() {
            self
        } else {
            Expression::unary(UnaryOp::BooleanCast, self)
        }
    }

    /// Evaluate against a context.
    pub fn evaluate(&self, context: &dyn EvaluationContext) -> Result<Value, EvalError> {
        Evaluator::new(context).eval(self)
    }
}
