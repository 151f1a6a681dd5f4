//! Tree-walking evaluator for selector expressions.
//!
//! Evaluation follows SQL three-valued logic: null stands for "unknown" and
//! propagates through arithmetic and comparisons. Type mismatches are not
//! unknowns; they surface as [`EvalError`].

use std::cmp::Ordering;

use super::numeric::{self, ArithOp};
use super::{EvalError, EvaluationContext, Value};
use crate::expr::{BinaryOp, Expression, InSet, UnaryOp};
use crate::eval::LikePattern;

/// The selector expression evaluator.
pub struct Evaluator<'a> {
    context: &'a dyn EvaluationContext,
}

impl<'a> Evaluator<'a> {
    /// Create a new evaluator.
    pub fn new(context: &'a dyn EvaluationContext) -> Self {
        Self { context }
    }

    /// Evaluate an expression.
    pub fn eval(&self, expr: &Expression) -> Result<Value, EvalError> {
        match expr {
            Expression::Constant(value) => Ok(value.clone()),
            Expression::Property(name) => Ok(self.context.get_property(name)),
            Expression::Unary { op, operand } => self.eval_unary(*op, operand),
            Expression::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expression::Like {
                operand,
                pattern,
                negated,
            } => self.eval_like(operand, pattern, *negated),
            Expression::In {
                operand,
                set,
                negated,
            } => self.eval_in(operand, set, *negated),
        }
    }

    // ==================== Unary ====================

    fn eval_unary(&self, op: UnaryOp, operand: &Expression) -> Result<Value, EvalError> {
        let value = self.eval(operand)?;
        Ok(match op {
            UnaryOp::Negate => numeric::negate(&value),
            UnaryOp::Not => match value {
                Value::Bool(b) => Value::Bool(!b),
                _ => Value::Null,
            },
            UnaryOp::IsNull => Value::Bool(value.is_null()),
            UnaryOp::IsNotNull => Value::Bool(!value.is_null()),
            UnaryOp::BooleanCast => match value {
                Value::Bool(_) => value,
                _ => Value::Null,
            },
        })
    }

    // ==================== Binary ====================

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
    ) -> Result<Value, EvalError> {
        match op {
            BinaryOp::And => return self.eval_and(left, right),
            BinaryOp::Or => return self.eval_or(left, right),
            _ => {}
        }

        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;

        match op {
            BinaryOp::Plus => self.eval_plus(lhs, rhs),
            BinaryOp::Minus => self.eval_arithmetic(op, ArithOp::Sub, lhs, rhs),
            BinaryOp::Multiply => self.eval_arithmetic(op, ArithOp::Mul, lhs, rhs),
            BinaryOp::Divide => self.eval_arithmetic(op, ArithOp::Div, lhs, rhs),
            BinaryOp::Mod => self.eval_arithmetic(op, ArithOp::Mod, lhs, rhs),
            _ => {
                let compared = self.compare(op, &lhs, &rhs)?;
                Ok(op.as_boolean(compared).map_or(Value::Null, Value::Bool))
            }
        }
    }

    /// `false AND x` is false whatever `x` is; otherwise null wins over true.
    fn eval_and(&self, left: &Expression, right: &Expression) -> Result<Value, EvalError> {
        let lhs = self.eval(left)?.as_bool();
        if lhs == Some(false) {
            return Ok(Value::Bool(false));
        }

        let rhs = self.eval(right)?.as_bool();
        Ok(match (lhs, rhs) {
            (_, Some(false)) => Value::Bool(false),
            (Some(true), Some(true)) => Value::Bool(true),
            _ => Value::Null,
        })
    }

    /// `true OR x` is true whatever `x` is; otherwise null wins over false.
    fn eval_or(&self, left: &Expression, right: &Expression) -> Result<Value, EvalError> {
        let lhs = self.eval(left)?.as_bool();
        if lhs == Some(true) {
            return Ok(Value::Bool(true));
        }

        let rhs = self.eval(right)?.as_bool();
        Ok(match (lhs, rhs) {
            (_, Some(true)) => Value::Bool(true),
            (Some(false), Some(false)) => Value::Bool(false),
            _ => Value::Null,
        })
    }

    fn eval_plus(&self, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
        match (&lhs, &rhs) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::String(s), _) => Ok(Value::string(format!("{}{}", s, rhs))),
            _ => self.eval_arithmetic(BinaryOp::Plus, ArithOp::Add, lhs, rhs),
        }
    }

    fn eval_arithmetic(
        &self,
        op: BinaryOp,
        arith: ArithOp,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value, EvalError> {
        if lhs.is_null() || rhs.is_null() {
            return Ok(Value::Null);
        }
        let aligned = numeric::align(&lhs, &rhs, op.symbol())?;
        Ok(aligned.arithmetic(arith))
    }

    /// Compare two operands. `Ok(None)` means the result is unknown.
    fn compare(
        &self,
        op: BinaryOp,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Option<Ordering>, EvalError> {
        match (lhs, rhs) {
            (Value::Null, Value::Null) => Ok(Some(Ordering::Equal)),
            (Value::Null, _) | (_, Value::Null) => Ok(None),
            (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
            (Value::Bool(a), Value::Bool(b))
                if matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) =>
            {
                Ok(Some(a.cmp(b)))
            }
            _ => Ok(numeric::align(lhs, rhs, op.symbol())?.compare()),
        }
    }

    // ==================== Predicates ====================

    fn eval_like(
        &self,
        operand: &Expression,
        pattern: &LikePattern,
        negated: bool,
    ) -> Result<Value, EvalError> {
        let matched = match self.eval(operand)? {
            Value::String(s) => pattern.is_match(&s),
            _ => false,
        };
        Ok(Value::Bool(matched != negated))
    }

    fn eval_in(&self, operand: &Expression, set: &InSet, negated: bool) -> Result<Value, EvalError> {
        let found = match self.eval(operand)? {
            Value::String(s) => set.contains(&s),
            _ => false,
        };
        Ok(Value::Bool(found != negated))
    }
}
