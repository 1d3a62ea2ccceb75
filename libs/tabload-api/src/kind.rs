use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ConversionError, DriverError};
use crate::storage::Statement;
use crate::value::{Value, ValueKind};

/// Conversion and binding strategy for one declared column type.
///
/// Strategies are stateless and shared between all columns of the same
/// type. `convert` never sees the null marker: nulls are resolved by the
/// column before the strategy is called.
pub trait KindStrategy: Send + Sync {
    /// Kind of the values this strategy produces.
    fn kind(&self) -> ValueKind;

    fn convert(&self, raw: &str) -> Result<Value, ConversionError>;

    /// Attach `value` to parameter `index`.
    fn bind(&self, statement: &mut dyn Statement, index: usize, value: &Value) -> Result<(), DriverError> {
        bind_value(statement, index, value)
    }

    /// Whether the empty string means NULL for columns of this type by default.
    fn empty_is_null(&self) -> bool {
        true
    }
}

/// Dispatch a value to the matching typed setter.
pub fn bind_value(statement: &mut dyn Statement, index: usize, value: &Value) -> Result<(), DriverError> {
    match value {
        Value::Int(v) => statement.set_int(index, *v),
        Value::Float(v) => statement.set_double(index, *v),
        Value::Text(v) => statement.set_string(index, v),
        Value::Null(kind) => statement.set_null(index, *kind),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntKind;

impl KindStrategy for IntKind {
    fn kind(&self) -> ValueKind {
        ValueKind::Int
    }

    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.parse::<i64>()
            .map(Value::Int)
            .map_err(|e| ConversionError::new(raw, ValueKind::Int, e))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatKind;

impl KindStrategy for FloatKind {
    fn kind(&self) -> ValueKind {
        ValueKind::Float
    }

    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        let v = raw
            .parse::<f64>()
            .map_err(|e| ConversionError::new(raw, ValueKind::Float, e))?;
        // Most drivers store NaN as NULL and reject infinities.
        if !v.is_finite() {
            return Err(ConversionError::new(raw, ValueKind::Float, "non-finite number"));
        }
        Ok(Value::Float(v))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextKind;

impl KindStrategy for TextKind {
    fn kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::Text(raw.to_string()))
    }

    fn empty_is_null(&self) -> bool {
        false
    }
}

/// Table of named column types.
///
/// Names are matched case-insensitively. [`KindRegistry::default`] holds
/// the built-in SQL-ish aliases; callers add their own with
/// [`KindRegistry::register`].
#[derive(Clone)]
pub struct KindRegistry {
    strategies: HashMap<String, Arc<dyn KindStrategy>>,
}

impl KindRegistry {
    /// Registry without any type.
    pub fn empty() -> Self {
        Self { strategies: HashMap::new() }
    }

    pub fn register(&mut self, name: &str, strategy: Arc<dyn KindStrategy>) -> &mut Self {
        self.strategies.insert(name.to_ascii_lowercase(), strategy);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn KindStrategy>> {
        self.strategies.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        let int: Arc<dyn KindStrategy> = Arc::new(IntKind);
        let float: Arc<dyn KindStrategy> = Arc::new(FloatKind);
        let text: Arc<dyn KindStrategy> = Arc::new(TextKind);

        let mut registry = Self::empty();
        for name in ["int", "integer", "bigint"] {
            registry.register(name, int.clone());
        }
        for name in ["double", "float", "real"] {
            registry.register(name, float.clone());
        }
        for name in ["string", "text", "varchar"] {
            registry.register(name, text.clone());
        }
        registry
    }
}

impl std::fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("KindRegistry").field("types", &names).finish()
    }
}
