use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{BindError, ColumnError, ConversionError, ValidityError};
use crate::kind::{FloatKind, IntKind, KindStrategy, TextKind};
use crate::storage::Statement;
use crate::value::{Value, ValueKind};

/// Validity predicate over a converted, non-null value.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Declarative value constraint, usually read from a load configuration.
///
/// Every bound is optional. `min`/`max` apply to numbers and compare
/// integers exactly, `max_len` to text (in characters). `one_of` compares
/// numbers by value (`"1"` matches `1.0`) and text verbatim.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Constraint {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub max_len: Option<usize>,
    pub one_of: Option<Vec<String>>,
}

impl Constraint {
    pub fn is_unbounded(&self) -> bool {
        self == &Constraint::default()
    }

    pub fn accepts(&self, value: &Value) -> bool {
        let out_of_range = match value {
            Value::Int(v) => {
                self.min.is_some_and(|min| int_below(*v, min)) || self.max.is_some_and(|max| int_above(*v, max))
            }
            Value::Float(v) => self.min.is_some_and(|min| *v < min) || self.max.is_some_and(|max| *v > max),
            _ => false,
        };
        if out_of_range {
            return false;
        }
        if let (Value::Text(s), Some(max_len)) = (value, self.max_len) {
            if s.chars().count() > max_len {
                return false;
            }
        }
        match &self.one_of {
            Some(allowed) => allowed.iter().any(|literal| matches_literal(value, literal)),
            None => true,
        }
    }
}

// i64 vs f64 without rounding the integer; a NaN bound rejects nothing.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

fn int_below(v: i64, bound: f64) -> bool {
    if bound.is_nan() || bound < -TWO_POW_63 {
        return false;
    }
    if bound >= TWO_POW_63 {
        return true;
    }
    v < bound.ceil() as i64
}

fn int_above(v: i64, bound: f64) -> bool {
    if bound.is_nan() || bound >= TWO_POW_63 {
        return false;
    }
    if bound < -TWO_POW_63 {
        return true;
    }
    v > bound.floor() as i64
}

fn matches_literal(value: &Value, literal: &str) -> bool {
    match value {
        Value::Int(v) => literal.parse::<i64>().is_ok_and(|l| l == *v),
        Value::Float(v) => literal.parse::<f64>().is_ok_and(|l| l == *v),
        Value::Text(s) => s == literal,
        Value::Null(_) => false,
    }
}

/// One column of the target table.
///
/// A column is bound to the field at `order` (0-based, left to right) and
/// fills statement parameter `order + 1`. It is immutable once built and
/// shared by every row of a load.
#[derive(Clone)]
pub struct Column {
    order: usize,
    name: String,
    strategy: Arc<dyn KindStrategy>,
    null_marker: Option<String>,
    predicate: Option<Predicate>,
}

impl Column {
    /// Column using `strategy`. Nullable through the empty string when the
    /// strategy treats empty text as null (numeric types do, text does not).
    pub fn new(order: usize, name: impl Into<String>, strategy: Arc<dyn KindStrategy>) -> Self {
        let null_marker = strategy.empty_is_null().then(String::new);
        Self { order, name: name.into(), strategy, null_marker, predicate: None }
    }

    pub fn int(order: usize, name: impl Into<String>) -> Self {
        Self::new(order, name, Arc::new(IntKind))
    }

    pub fn float(order: usize, name: impl Into<String>) -> Self {
        Self::new(order, name, Arc::new(FloatKind))
    }

    pub fn text(order: usize, name: impl Into<String>) -> Self {
        Self::new(order, name, Arc::new(TextKind))
    }

    /// Treat `marker` (exact match) as NULL.
    pub fn with_null_marker(mut self, marker: impl Into<String>) -> Self {
        self.null_marker = Some(marker.into());
        self
    }

    /// Never produce NULL: every field goes through conversion.
    pub fn not_null(mut self) -> Self {
        self.null_marker = None;
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn with_constraint(self, constraint: Constraint) -> Self {
        if constraint.is_unbounded() {
            return self;
        }
        self.with_predicate(move |v| constraint.accepts(v))
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.strategy.kind()
    }

    pub fn is_nullable(&self) -> bool {
        self.null_marker.is_some()
    }

    /// Convert raw text into this column's value.
    pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        if self.null_marker.as_deref() == Some(raw) {
            return Ok(Value::Null(self.kind()));
        }
        self.strategy.convert(raw)
    }

    /// Whether `raw` converts and passes the predicate. Never fails.
    pub fn is_valid(&self, raw: &str) -> bool {
        self.check(raw).is_ok()
    }

    /// Convert and run the predicate. NULL skips the predicate.
    pub fn check(&self, raw: &str) -> Result<Value, ColumnError> {
        let value = self.convert(raw)?;
        if value.is_null() {
            return Ok(value);
        }
        match &self.predicate {
            Some(predicate) if !predicate(&value) => Err(ValidityError::new(&self.name, raw).into()),
            _ => Ok(value),
        }
    }

    /// Convert `raw` and bind it to parameter `index`.
    ///
    /// The predicate is not consulted here; see [`Column::check`].
    pub fn bind_to_statement(&self, statement: &mut dyn Statement, index: usize, raw: &str) -> Result<(), ColumnError> {
        let value = self.convert(raw)?;
        self.bind_value(statement, index, raw, &value)?;
        Ok(())
    }

    /// Bind an already converted value; `raw` is only used for the error message.
    pub fn bind_value(&self, statement: &mut dyn Statement, index: usize, raw: &str, value: &Value) -> Result<(), BindError> {
        self.strategy
            .bind(statement, index, value)
            .map_err(|e| BindError::new(value.kind(), raw, e))
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("order", &self.order)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("null_marker", &self.null_marker)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
