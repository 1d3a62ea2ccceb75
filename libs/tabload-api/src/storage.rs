use crate::error::DriverError;
use crate::value::ValueKind;

/// Database connection, as seen by the loader.
///
/// The loader only prepares statements on it. Opening, transactions and
/// closing belong to whoever owns the connection.
pub trait Connection {
    /// Prepare a parameterized statement. Parameters are numbered from 1.
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError>;
}

/// Prepared statement with JDBC-like batching.
///
/// Parameter indexes are 1-based. A bound parameter keeps its value until
/// it is overwritten or [`Statement::clear_parameters`] is called.
pub trait Statement {
    /// Number of `?` placeholders in the statement.
    fn parameter_count(&self) -> usize;

    fn set_int(&mut self, index: usize, value: i64) -> Result<(), DriverError>;

    fn set_double(&mut self, index: usize, value: f64) -> Result<(), DriverError>;

    fn set_string(&mut self, index: usize, value: &str) -> Result<(), DriverError>;

    /// Bind SQL NULL typed as `kind`.
    fn set_null(&mut self, index: usize, kind: ValueKind) -> Result<(), DriverError>;

    fn clear_parameters(&mut self) -> Result<(), DriverError>;

    /// Snapshot the current parameters as one batch entry.
    fn add_batch(&mut self) -> Result<(), DriverError>;

    /// Execute once with the current parameters; returns affected rows.
    fn execute(&mut self) -> Result<u64, DriverError>;

    /// Execute every batch entry, in order, and clear the batch.
    ///
    /// Returns one affected-row count per entry.
    fn execute_batch(&mut self) -> Result<Vec<u64>, DriverError>;

    /// Release the statement. Any later call other than `close` fails.
    fn close(&mut self) -> Result<(), DriverError>;

    fn is_closed(&self) -> bool;
}
