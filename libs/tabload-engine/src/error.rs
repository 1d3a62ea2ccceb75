use std::fmt;
use std::sync::Arc;

use tabload_api::{DriverError, RowError, ShapeError};

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Aggregated row-level failures of one load.
///
/// Keeps a summary message, every row error in source order and an
/// optional root cause. The list is shared and read-only: callers get
/// slices and iterators, never the backing storage.
#[derive(Debug, Clone)]
pub struct ParseErrorSet {
    message: String,
    errors: Arc<[RowError]>,
    cause: Option<Arc<Cause>>,
}

impl ParseErrorSet {
    pub fn new(message: impl Into<String>, errors: impl Into<Arc<[RowError]>>) -> Self {
        Self { message: message.into(), errors: errors.into(), cause: None }
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(Arc::new(cause.into()));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ParseErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseErrorSet {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| &**c as &(dyn std::error::Error + 'static))
    }
}

impl<'a> IntoIterator for &'a ParseErrorSet {
    type Item = &'a RowError;
    type IntoIter = std::slice::Iter<'a, RowError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Load configuration could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config {}: {source}", .path.display())]
    Read { path: std::path::PathBuf, source: std::io::Error },

    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Why a load did not complete cleanly.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(i64),

    #[error("schema mismatch at row {}: expected {} fields, got {}", .0.row, .0.expected, .0.actual)]
    SchemaMismatch(ShapeError),

    #[error("{errors} ({inserted} rows inserted)")]
    RowErrors { inserted: u64, errors: ParseErrorSet },

    #[error("chunk starting at row {chunk_start} failed: {source}")]
    ExecutionFailure { chunk_start: u64, source: DriverError },

    #[error("prepare insert: {0}")]
    Prepare(DriverError),

    #[error("read source at row {row}: {source}")]
    Source { row: u64, source: std::io::Error },
}

impl LoadError {
    /// Row errors collected before the load ended, if that is why it failed.
    pub fn row_errors(&self) -> Option<&ParseErrorSet> {
        match self {
            LoadError::RowErrors { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Rows the database confirmed before the failure was reported.
    pub fn inserted(&self) -> u64 {
        match self {
            LoadError::RowErrors { inserted, .. } => *inserted,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tabload_api::{ConversionError, ValueKind};

    fn row_error(row: u64) -> RowError {
        RowError::new(row, "n", "x", ConversionError::new("x", ValueKind::Int, "bad").into())
    }

    #[test]
    fn keeps_message_and_order() {
        let set = ParseErrorSet::new("a message", vec![row_error(2), row_error(5)]);
        assert_eq!(set.to_string(), "a message");
        assert_eq!(set.iter().map(RowError::row).collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(set.errors()[0].row(), 2);
    }

    #[test]
    fn clones_share_the_list() {
        let set = ParseErrorSet::new("m", vec![row_error(1)]);
        let copy = set.clone();
        drop(set);
        assert_eq!(copy.len(), 1);
    }

    #[test]
    fn chained_cause() {
        let cause = "1.5".parse::<i64>().unwrap_err();
        let set = ParseErrorSet::new("m", vec![row_error(1)]).with_cause(cause);
        assert_eq!(set.errors()[0].row(), 1);
        assert!(set.source().is_some());
        assert!(ParseErrorSet::new("m", Vec::<RowError>::new()).source().is_none());
    }

    #[test]
    fn load_error_messages() {
        let e = LoadError::ExecutionFailure { chunk_start: 3, source: DriverError::new("disk full") };
        assert_eq!(e.to_string(), "chunk starting at row 3 failed: disk full");

        let e = LoadError::SchemaMismatch(ShapeError { row: 4, expected: 2, actual: 3 });
        assert_eq!(e.to_string(), "schema mismatch at row 4: expected 2 fields, got 3");

        let e = LoadError::RowErrors { inserted: 2, errors: ParseErrorSet::new("1 of 3 rows failed", vec![row_error(2)]) };
        assert_eq!(e.to_string(), "1 of 3 rows failed (2 rows inserted)");
        assert_eq!(e.inserted(), 2);
        assert_eq!(e.row_errors().map(ParseErrorSet::len), Some(1));
    }
}
