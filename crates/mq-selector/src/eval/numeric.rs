//! Numeric promotion lattice and native-width arithmetic.
//!
//! Binary numeric operators first look up the common kind of their two
//! operands in [`PROMOTION`], convert both sides to it, then operate in that
//! kind's native width. Mixed signed/unsigned pairs widen to a signed kind
//! large enough for both ranges, except that `UInt64` never widens past
//! `Int64`; such conversions fail with an overflow error when out of range.

use std::cmp::Ordering;

use super::{EvalError, NumericKind, Value};

/// Common kind for every pair of numeric kinds, indexed `[left][right]`.
const PROMOTION: [[NumericKind; 11]; 11] = {
    use NumericKind::{
        Char16 as C16, Float32 as F32, Float64 as F64, Int16 as I16, Int32 as I32, Int64 as I64,
        Int8 as I8, UInt16 as U16, UInt32 as U32, UInt64 as U64, UInt8 as U8,
    };
    [
        //  I8   U8   C16  I16  U16  I32  U32  I64  U64  F32  F64
        [I8, I16, I32, I16, I32, I32, I64, I64, I64, F32, F64], // I8
        [I16, U8, U16, I16, U16, I32, U32, I64, U64, F32, F64], // U8
        [I32, U16, C16, I32, U16, I32, I64, I64, U64, F32, F64], // C16
        [I16, I16, I32, I16, I32, I32, I64, I64, I64, F32, F64], // I16
        [I32, U16, U16, I32, U16, I32, U32, I64, U64, F32, F64], // U16
        [I32, I32, I32, I32, I32, I32, I64, I64, I64, F32, F64], // I32
        [I64, U32, I64, I64, U32, I64, U32, I64, U64, F32, F64], // U32
        [I64, I64, I64, I64, I64, I64, I64, I64, I64, F32, F64], // I64
        [I64, U64, U64, I64, U64, I64, U64, I64, U64, F32, F64], // U64
        [F32, F32, F32, F32, F32, F32, F32, F32, F32, F32, F64], // F32
        [F64, F64, F64, F64, F64, F64, F64, F64, F64, F64, F64], // F64
    ]
};

/// The common kind both operands are converted to.
pub fn promote(left: NumericKind, right: NumericKind) -> NumericKind {
    PROMOTION[left.index()][right.index()]
}

/// Arithmetic operators over aligned operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Two operands converted to their common kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aligned {
    Int8(i8, i8),
    UInt8(u8, u8),
    Char16(u16, u16),
    Int16(i16, i16),
    UInt16(u16, u16),
    Int32(i32, i32),
    UInt32(u32, u32),
    Int64(i64, i64),
    UInt64(u64, u64),
    Float32(f32, f32),
    Float64(f64, f64),
}

/// Align two numeric values to their common kind.
///
/// `op` names the operator for error messages. Non-numeric operands are an
/// unsupported type error.
pub fn align(left: &Value, right: &Value, op: &str) -> Result<Aligned, EvalError> {
    let (Some(lk), Some(rk)) = (left.numeric_kind(), right.numeric_kind()) else {
        return Err(EvalError::unsupported_types(
            op,
            left.type_name(),
            right.type_name(),
        ));
    };

    let kind = promote(lk, rk);
    Ok(match kind {
        NumericKind::Int8 => Aligned::Int8(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::UInt8 => Aligned::UInt8(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::Char16 => Aligned::Char16(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::Int16 => Aligned::Int16(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::UInt16 => Aligned::UInt16(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::Int32 => Aligned::Int32(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::UInt32 => Aligned::UInt32(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::Int64 => Aligned::Int64(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::UInt64 => Aligned::UInt64(narrow(left, kind)?, narrow(right, kind)?),
        NumericKind::Float32 => Aligned::Float32(to_f32(left), to_f32(right)),
        NumericKind::Float64 => Aligned::Float64(to_f64(left), to_f64(right)),
    })
}

/// Integer payload of a value, widened so every integer kind fits.
fn integer(value: &Value) -> Option<i128> {
    Some(match value {
        Value::Int8(n) => i128::from(*n),
        Value::UInt8(n) => i128::from(*n),
        Value::Char16(n) | Value::UInt16(n) => i128::from(*n),
        Value::Int16(n) => i128::from(*n),
        Value::Int32(n) => i128::from(*n),
        Value::UInt32(n) => i128::from(*n),
        Value::Int64(n) => i128::from(*n),
        Value::UInt64(n) => i128::from(*n),
        _ => return None,
    })
}

fn narrow<T: TryFrom<i128>>(value: &Value, kind: NumericKind) -> Result<T, EvalError> {
    integer(value)
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| {
            EvalError::overflow(format!(
                "{} value {} does not fit in {}",
                value.type_name(),
                value,
                kind.name()
            ))
        })
}

fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Float32(n) => f64::from(*n),
        Value::Float64(n) => *n,
        other => integer(other).map_or(f64::NAN, |n| n as f64),
    }
}

fn to_f32(value: &Value) -> f32 {
    match value {
        Value::Float32(n) => *n,
        Value::Float64(n) => *n as f32,
        other => integer(other).map_or(f32::NAN, |n| n as f32),
    }
}

macro_rules! int_arith {
    ($variant:ident, $a:expr, $b:expr, $op:expr) => {
        match $op {
            ArithOp::Add => Value::$variant($a.wrapping_add($b)),
            ArithOp::Sub => Value::$variant($a.wrapping_sub($b)),
            ArithOp::Mul => Value::$variant($a.wrapping_mul($b)),
            ArithOp::Div if $b == 0 => Value::Null,
            ArithOp::Div => Value::$variant($a.wrapping_div($b)),
            ArithOp::Mod if $b == 0 => Value::Null,
            ArithOp::Mod => Value::$variant($a.wrapping_rem($b)),
        }
    };
}

macro_rules! float_arith {
    ($variant:ident, $a:expr, $b:expr, $op:expr) => {
        Value::$variant(match $op {
            ArithOp::Add => $a + $b,
            ArithOp::Sub => $a - $b,
            ArithOp::Mul => $a * $b,
            ArithOp::Div => $a / $b,
            ArithOp::Mod => $a % $b,
        })
    };
}

impl Aligned {
    /// Apply an arithmetic operator in the aligned kind's native width.
    ///
    /// Integer results wrap. Integer division or modulo by zero is null.
    pub fn arithmetic(self, op: ArithOp) -> Value {
        match self {
            Aligned::Int8(a, b) => int_arith!(Int8, a, b, op),
            Aligned::UInt8(a, b) => int_arith!(UInt8, a, b, op),
            Aligned::Char16(a, b) => int_arith!(Char16, a, b, op),
            Aligned::Int16(a, b) => int_arith!(Int16, a, b, op),
            Aligned::UInt16(a, b) => int_arith!(UInt16, a, b, op),
            Aligned::Int32(a, b) => int_arith!(Int32, a, b, op),
            Aligned::UInt32(a, b) => int_arith!(UInt32, a, b, op),
            Aligned::Int64(a, b) => int_arith!(Int64, a, b, op),
            Aligned::UInt64(a, b) => int_arith!(UInt64, a, b, op),
            Aligned::Float32(a, b) => float_arith!(Float32, a, b, op),
            Aligned::Float64(a, b) => float_arith!(Float64, a, b, op),
        }
    }

    /// Compare the aligned operands. `None` when either float is NaN.
    pub fn compare(self) -> Option<Ordering> {
        match self {
            Aligned::Int8(a, b) => Some(a.cmp(&b)),
            Aligned::UInt8(a, b) => Some(a.cmp(&b)),
            Aligned::Char16(a, b) | Aligned::UInt16(a, b) => Some(a.cmp(&b)),
            Aligned::Int16(a, b) => Some(a.cmp(&b)),
            Aligned::Int32(a, b) => Some(a.cmp(&b)),
            Aligned::UInt32(a, b) => Some(a.cmp(&b)),
            Aligned::Int64(a, b) => Some(a.cmp(&b)),
            Aligned::UInt64(a, b) => Some(a.cmp(&b)),
            Aligned::Float32(a, b) => a.partial_cmp(&b),
            Aligned::Float64(a, b) => a.partial_cmp(&b),
        }
    }
}

/// Arithmetic negation. Unsigned kinds widen to the next signed kind;
/// null and non-numeric operands yield null.
pub fn negate(value: &Value) -> Value {
    match value {
        Value::Int8(n) => Value::Int8(n.wrapping_neg()),
        Value::Int16(n) => Value::Int16(n.wrapping_neg()),
        Value::Int32(n) => Value::Int32(n.wrapping_neg()),
        Value::Int64(n) => Value::Int64(n.wrapping_neg()),
        Value::UInt8(n) => Value::Int16(-i16::from(*n)),
        Value::UInt16(n) | Value::Char16(n) => Value::Int32(-i32::from(*n)),
        Value::UInt32(n) => Value::Int64(-i64::from(*n)),
        Value::UInt64(n) => i64::try_from(-i128::from(*n)).map_or(Value::Null, Value::Int64),
        Value::Float32(n) => Value::Float32(-n),
        Value::Float64(n) => Value::Float64(-n),
        Value::Null | Value::Bool(_) | Value::String(_) => Value::Null,
    }
}
