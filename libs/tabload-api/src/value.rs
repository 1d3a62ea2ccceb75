use std::fmt;

/// Scalar kinds a column can declare.
///
/// The set is closed: every driver must know how to bind each kind,
/// including its typed null. New column *types* are added through
/// [`crate::kind::KindRegistry`], not by extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Text,
}

impl ValueKind {
    /// Suffix of the driver setter for this kind (`setInt`, `setDouble`, `setString`).
    pub fn setter(self) -> &'static str {
        match self {
            ValueKind::Int => "Int",
            ValueKind::Float => "Double",
            ValueKind::Text => "String",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => f.write_str("int"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Text => f.write_str("text"),
        }
    }
}

/// Converted field value.
///
/// Produced by a column from one raw text field and consumed once when it
/// is bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    /// Typed null: drivers bind it through their null path for `kind`.
    Null(ValueKind),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Null(kind) => *kind,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Numeric value as `f64`; integers beyond 2^53 are rounded.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Text(v) => f.write_str(v),
            Value::Null(_) => f.write_str("NULL"),
        }
    }
}
