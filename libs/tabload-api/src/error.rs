use std::fmt;

use crate::value::ValueKind;

/// Error reported by a database driver (prepare, bind, execute, close).
///
/// Drivers map their native error into this type; the message is kept
/// verbatim because it ends up in user-facing bind errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    message: String,
}

impl DriverError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into() }
    }

    /// Operation attempted on a statement that was already closed.
    pub fn closed() -> Self {
        Self::new("statement is closed")
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DriverError {}

impl From<String> for DriverError {
    fn from(s: String) -> Self {
        Self { message: s }
    }
}

impl From<&str> for DriverError {
    fn from(s: &str) -> Self {
        Self { message: s.to_string() }
    }
}

/// Raw text could not become a value of the column's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    raw: String,
    kind: ValueKind,
    detail: String,
}

impl ConversionError {
    pub fn new(raw: impl Into<String>, kind: ValueKind, detail: impl fmt::Display) -> Self {
        Self { raw: raw.into(), kind, detail: detail.to_string() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert '{}' to {}: {}", self.raw, self.kind, self.detail)
    }
}

impl std::error::Error for ConversionError {}

/// A converted value was rejected by the column predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityError {
    column: String,
    raw: String,
}

impl ValidityError {
    pub fn new(column: impl Into<String>, raw: impl Into<String>) -> Self {
        Self { column: column.into(), raw: raw.into() }
    }
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value '{}' rejected by column '{}'", self.raw, self.column)
    }
}

impl std::error::Error for ValidityError {}

/// The driver refused a well-typed value.
///
/// Renders as `set<Type> error with value '<raw>': <driver message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindError {
    kind: ValueKind,
    raw: String,
    source: DriverError,
}

impl BindError {
    pub fn new(kind: ValueKind, raw: impl Into<String>, source: DriverError) -> Self {
        Self { kind, raw: raw.into(), source }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn driver_error(&self) -> &DriverError {
        &self.source
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set{} error with value '{}': {}", self.kind.setter(), self.raw, self.source)
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Field-level failure while checking or binding one raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnError {
    Conversion(ConversionError),
    Invalid(ValidityError),
    Bind(BindError),
}

impl ColumnError {
    /// Short reason tag used in reports: `conversion`, `validation` or `bind`.
    pub fn reason(&self) -> &'static str {
        match self {
            ColumnError::Conversion(_) => "conversion",
            ColumnError::Invalid(_) => "validation",
            ColumnError::Bind(_) => "bind",
        }
    }
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnError::Conversion(e) => e.fmt(f),
            ColumnError::Invalid(e) => e.fmt(f),
            ColumnError::Bind(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ColumnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ColumnError::Conversion(e) => Some(e),
            ColumnError::Invalid(e) => Some(e),
            ColumnError::Bind(e) => Some(e),
        }
    }
}

impl From<ConversionError> for ColumnError {
    fn from(e: ConversionError) -> Self {
        ColumnError::Conversion(e)
    }
}

impl From<ValidityError> for ColumnError {
    fn from(e: ValidityError) -> Self {
        ColumnError::Invalid(e)
    }
}

impl From<BindError> for ColumnError {
    fn from(e: BindError) -> Self {
        ColumnError::Bind(e)
    }
}

/// A recoverable, row-scoped failure: the row is excluded from the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    row: u64,
    column: String,
    raw: String,
    error: ColumnError,
}

impl RowError {
    pub fn new(row: u64, column: impl Into<String>, raw: impl Into<String>, error: ColumnError) -> Self {
        Self { row, column: column.into(), raw: raw.into(), error }
    }

    /// 1-based index of the data row in the source.
    pub fn row(&self) -> u64 {
        self.row
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn reason(&self) -> &'static str {
        self.error.reason()
    }

    pub fn error(&self) -> &ColumnError {
        &self.error
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column '{}': {}", self.row, self.column, self.error)
    }
}

impl std::error::Error for RowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Record field count disagrees with the schema cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeError {
    pub row: u64,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: expected {} fields, got {}", self.row, self.expected, self.actual)
    }
}

impl std::error::Error for ShapeError {}

/// Invalid column set given to [`crate::schema::Schema::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Empty,
    DuplicateOrder { order: usize, first: String, second: String },
    MissingOrder(usize),
    DuplicateName(String),
    UnknownType { column: String, type_name: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Empty => f.write_str("schema has no columns"),
            SchemaError::DuplicateOrder { order, first, second } => {
                write!(f, "columns '{first}' and '{second}' share order {order}")
            }
            SchemaError::MissingOrder(order) => {
                write!(f, "no column with order {order}; orders must be contiguous from 0")
            }
            SchemaError::DuplicateName(name) => write!(f, "duplicate column name '{name}'"),
            SchemaError::UnknownType { column, type_name } => {
                write!(f, "column '{column}': unknown type '{type_name}'")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
