use rusqlite::types::Value as SqlValue;

use tabload_api::{Connection, DriverError, Statement, ValueKind};

const CHUNK_SAVEPOINT: &str = "tabload_chunk";

fn driver_err(e: rusqlite::Error) -> DriverError {
    DriverError::new(e.to_string())
}

/// SQLite [`Connection`] over a borrowed `rusqlite::Connection`.
///
/// The caller keeps ownership: transactions, pragmas and closing stay on
/// the caller's side. A `rusqlite::Transaction` derefs to a connection, so
/// a load can run inside one.
pub struct SqliteConnection<'c> {
    conn: &'c rusqlite::Connection,
}

impl<'c> SqliteConnection<'c> {
    pub fn new(conn: &'c rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Prepare without boxing, for callers that want the concrete type.
    pub fn prepare_statement(&self, sql: &str) -> Result<SqliteStatement<'c>, DriverError> {
        let inner = self.conn.prepare(sql).map_err(driver_err)?;
        Ok(SqliteStatement::new(self.conn, inner))
    }
}

impl Connection for SqliteConnection<'_> {
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError> {
        Ok(Box::new(self.prepare_statement(sql)?))
    }
}

/// Prepared SQLite statement with buffered parameters and batches.
///
/// SQLite has no native batch API: `add_batch` snapshots the bound
/// parameters and `execute_batch` replays them inside a savepoint, so a
/// failing batch leaves none of its rows behind.
pub struct SqliteStatement<'c> {
    conn: &'c rusqlite::Connection,
    inner: Option<rusqlite::Statement<'c>>,
    params: Vec<Option<SqlValue>>,
    batch: Vec<Vec<SqlValue>>,
}

impl<'c> SqliteStatement<'c> {
    fn new(conn: &'c rusqlite::Connection, inner: rusqlite::Statement<'c>) -> Self {
        let params = vec![None; inner.parameter_count()];
        Self { conn, inner: Some(inner), params, batch: Vec::new() }
    }

    /// Entries waiting for `execute_batch`.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    fn set(&mut self, index: usize, value: SqlValue) -> Result<(), DriverError> {
        if self.inner.is_none() {
            return Err(DriverError::closed());
        }
        let count = self.params.len();
        match index.checked_sub(1).and_then(|i| self.params.get_mut(i)) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(DriverError::new(format!(
                "parameter index {index} out of range (1..={count})"
            ))),
        }
    }

    fn bound(&self) -> Result<Vec<SqlValue>, DriverError> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                p.clone()
                    .ok_or_else(|| DriverError::new(format!("parameter {} is not bound", i + 1)))
            })
            .collect()
    }

    fn run_batch(
        conn: &rusqlite::Connection,
        stmt: &mut rusqlite::Statement<'_>,
        batch: &[Vec<SqlValue>],
    ) -> Result<Vec<u64>, DriverError> {
        conn.execute_batch(&format!("SAVEPOINT {CHUNK_SAVEPOINT}")).map_err(driver_err)?;

        let mut counts = Vec::with_capacity(batch.len());
        for (i, row) in batch.iter().enumerate() {
            match stmt.execute(rusqlite::params_from_iter(row.iter())) {
                Ok(n) => counts.push(n as u64),
                Err(e) => {
                    let rollback = format!("ROLLBACK TO {CHUNK_SAVEPOINT}; RELEASE {CHUNK_SAVEPOINT}");
                    if let Err(re) = conn.execute_batch(&rollback) {
                        tracing::warn!(error = %re, "savepoint rollback failed");
                    }
                    return Err(DriverError::new(format!("batch entry {}: {e}", i + 1)));
                }
            }
        }

        conn.execute_batch(&format!("RELEASE {CHUNK_SAVEPOINT}")).map_err(driver_err)?;
        Ok(counts)
    }
}

impl Statement for SqliteStatement<'_> {
    fn parameter_count(&self) -> usize {
        self.params.len()
    }

    fn set_int(&mut self, index: usize, value: i64) -> Result<(), DriverError> {
        self.set(index, SqlValue::Integer(value))
    }

    fn set_double(&mut self, index: usize, value: f64) -> Result<(), DriverError> {
        self.set(index, SqlValue::Real(value))
    }

    fn set_string(&mut self, index: usize, value: &str) -> Result<(), DriverError> {
        self.set(index, SqlValue::Text(value.to_string()))
    }

    fn set_null(&mut self, index: usize, _kind: ValueKind) -> Result<(), DriverError> {
        // SQLite NULL is untyped.
        self.set(index, SqlValue::Null)
    }

    fn clear_parameters(&mut self) -> Result<(), DriverError> {
        if self.inner.is_none() {
            return Err(DriverError::closed());
        }
        self.params.iter_mut().for_each(|p| *p = None);
        Ok(())
    }

    fn add_batch(&mut self) -> Result<(), DriverError> {
        if self.inner.is_none() {
            return Err(DriverError::closed());
        }
        let row = self.bound()?;
        self.batch.push(row);
        Ok(())
    }

    fn execute(&mut self) -> Result<u64, DriverError> {
        if self.inner.is_none() {
            return Err(DriverError::closed());
        }
        let row = self.bound()?;
        let stmt = self.inner.as_mut().ok_or_else(DriverError::closed)?;
        let n = stmt.execute(rusqlite::params_from_iter(row.iter())).map_err(driver_err)?;
        Ok(n as u64)
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>, DriverError> {
        let stmt = self.inner.as_mut().ok_or_else(DriverError::closed)?;
        let batch = std::mem::take(&mut self.batch);
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        Self::run_batch(self.conn, stmt, &batch)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.params.iter_mut().for_each(|p| *p = None);
        self.batch.clear();
        match self.inner.take() {
            Some(stmt) => stmt.finalize().map_err(driver_err),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}
