//! Runtime values for selector evaluation.
//!
//! `Value` is null, a boolean, a string, or one of eleven numeric kinds.
//! Numeric operators never mix kinds directly; operands are first aligned
//! through the promotion lattice in [`super::numeric`].

use std::fmt;
use std::sync::Arc;

/// A selector runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unknown / absent value.
    Null,
    Bool(bool),
    /// Unicode string (Arc for cheap cloning).
    String(Arc<str>),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    /// A UTF-16 code unit.
    Char16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
}

/// The eleven numeric kinds, in promotion lattice order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int8,
    UInt8,
    Char16,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl NumericKind {
    /// All kinds in lattice order.
    pub const ALL: [NumericKind; 11] = [
        NumericKind::Int8,
        NumericKind::UInt8,
        NumericKind::Char16,
        NumericKind::Int16,
        NumericKind::UInt16,
        NumericKind::Int32,
        NumericKind::UInt32,
        NumericKind::Int64,
        NumericKind::UInt64,
        NumericKind::Float32,
        NumericKind::Float64,
    ];

    /// Row/column index into the promotion table.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Int8 => "int8",
            NumericKind::UInt8 => "uint8",
            NumericKind::Char16 => "char16",
            NumericKind::Int16 => "int16",
            NumericKind::UInt16 => "uint16",
            NumericKind::Int32 => "int32",
            NumericKind::UInt32 => "uint32",
            NumericKind::Int64 => "int64",
            NumericKind::UInt64 => "uint64",
            NumericKind::Float32 => "float32",
            NumericKind::Float64 => "float64",
        }
    }
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Arc::from(s.as_ref()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The numeric kind of this value, or `None` for null, bool and string.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        Some(match self {
            Value::Int8(_) => NumericKind::Int8,
            Value::UInt8(_) => NumericKind::UInt8,
            Value::Char16(_) => NumericKind::Char16,
            Value::Int16(_) => NumericKind::Int16,
            Value::UInt16(_) => NumericKind::UInt16,
            Value::Int32(_) => NumericKind::Int32,
            Value::UInt32(_) => NumericKind::UInt32,
            Value::Int64(_) => NumericKind::Int64,
            Value::UInt64(_) => NumericKind::UInt64,
            Value::Float32(_) => NumericKind::Float32,
            Value::Float64(_) => NumericKind::Float64,
            Value::Null | Value::Bool(_) | Value::String(_) => return None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            other => other.numeric_kind().map_or("unknown", NumericKind::name),
        }
    }
}

/// Textual form used by string concatenation. Strings are written bare.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::Int8(n) => write!(f, "{}", n),
            Value::UInt8(n) => write!(f, "{}", n),
            Value::Int16(n) => write!(f, "{}", n),
            Value::UInt16(n) => write!(f, "{}", n),
            Value::Char16(c) => match char::from_u32(u32::from(*c)) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "{}", char::REPLACEMENT_CHARACTER),
            },
            Value::Int32(n) => write!(f, "{}", n),
            Value::UInt32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::UInt64(n) => write!(f, "{}", n),
            Value::Float32(n) => write!(f, "{}", n),
            Value::Float64(n) => write!(f, "{}", n),
        }
    }
}

// ==================== From Implementations ====================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::String(s)
    }
}

impl From<i8> for Value {
    fn from(n: i8) -> Self {
        Value::Int8(n)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::UInt8(n)
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Value::Int16(n)
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Value::UInt16(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::UInt32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt64(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float32(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float64(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
