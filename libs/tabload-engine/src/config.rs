use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use tabload_api::{Column, Constraint, KindRegistry, Schema, SchemaError};

use crate::error::{ConfigError, LoadError};

/// Rows per flushed batch. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChunkSize(NonZeroUsize);

impl ChunkSize {
    /// One flush at end of stream.
    pub const MAX: ChunkSize = ChunkSize(NonZeroUsize::MAX);

    /// Validate a caller-supplied size; zero and negatives are rejected.
    pub fn new(size: i64) -> Result<Self, LoadError> {
        if size <= 0 {
            return Err(LoadError::InvalidChunkSize(size));
        }
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        NonZeroUsize::new(size).map(Self).ok_or(LoadError::InvalidChunkSize(0))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<i64> for ChunkSize {
    type Error = LoadError;

    fn try_from(size: i64) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

/// Load job description, parsed from TOML.
///
/// ```toml
/// database = "quotes.db"
/// table = "quotes"
/// source = "quotes.csv"
/// chunk_size = 1000
///
/// [csv]
/// header = true
///
/// [[columns]]
/// name = "id"
/// type = "int"
/// nullable = false
///
/// [[columns]]
/// name = "price"
/// type = "double"
/// constraint = { min = 0 }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    /// Database file.
    pub database: PathBuf,

    /// Target table.
    pub table: String,

    /// Input file. Read from stdin when absent.
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Rows per batch; one batch for the whole input when absent.
    #[serde(default)]
    pub chunk_size: Option<i64>,

    /// Run the whole load in one transaction, rolled back on any failure.
    #[serde(default)]
    pub atomic: bool,

    /// Double-quote table and column names in the generated insert.
    #[serde(default)]
    pub quote_identifiers: bool,

    /// Format options, interpreted by the format plugin.
    #[serde(default)]
    pub csv: Option<toml::Value>,

    /// Columns in field order unless `order` is given explicitly.
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub name: String,

    /// Registered type name (`int`, `double`, `text`, ...).
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub order: Option<usize>,

    #[serde(default)]
    pub nullable: Option<bool>,

    /// Exact text meaning NULL. Implies `nullable`.
    #[serde(default)]
    pub null_marker: Option<String>,

    #[serde(default)]
    pub constraint: Constraint,
}

impl ColumnConfig {
    fn build(&self, position: usize, registry: &KindRegistry) -> Result<Column, SchemaError> {
        let strategy = registry.get(&self.type_name).ok_or_else(|| SchemaError::UnknownType {
            column: self.name.clone(),
            type_name: self.type_name.clone(),
        })?;

        let mut column = Column::new(self.order.unwrap_or(position), &self.name, strategy);
        column = match (&self.null_marker, self.nullable) {
            (Some(marker), _) => column.with_null_marker(marker),
            (None, Some(false)) => column.not_null(),
            (None, Some(true)) if !column.is_nullable() => column.with_null_marker(""),
            _ => column,
        };
        Ok(column.with_constraint(self.constraint.clone()))
    }
}

impl LoadConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn schema(&self, registry: &KindRegistry) -> Result<Schema, SchemaError> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.build(i, registry))
            .collect::<Result<Vec<_>, _>>()?;
        Schema::new(columns)
    }

    pub fn chunk_size(&self) -> Result<ChunkSize, LoadError> {
        self.chunk_size.map_or(Ok(ChunkSize::MAX), ChunkSize::new)
    }
}
