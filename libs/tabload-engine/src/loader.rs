use std::cell::Cell;
use std::io::BufRead;

use tabload_api::{Connection, InsertSql, RecordParser, RecordStream, Schema, Statement, StatementBuilder};

use crate::binder::StatementBinder;
use crate::config::ChunkSize;
use crate::error::{LoadError, ParseErrorSet};
use crate::executor::{ChunkedExecutor, LoadState};

/// Streams parsed records into a table through one prepared insert.
///
/// Rows are batched and executed every `chunk_size` input rows. A row
/// that fails to convert, validate or bind is skipped and reported; the
/// rest of the input is still loaded. Transactions are left to the
/// caller: every executed chunk stays in whatever transaction the
/// connection is in.
pub struct BatchLoader {
    builder: Box<dyn StatementBuilder + Send + Sync>,
    chunk_size: ChunkSize,
    state: Cell<LoadState>,
}

impl BatchLoader {
    /// Loader with a caller-supplied chunk size; zero and negatives are rejected.
    pub fn new(chunk_size: i64) -> Result<Self, LoadError> {
        Ok(Self::with_chunk_size(ChunkSize::new(chunk_size)?))
    }

    pub fn with_chunk_size(chunk_size: ChunkSize) -> Self {
        Self { builder: Box::new(InsertSql::default()), chunk_size, state: Cell::new(LoadState::Idle) }
    }

    /// Replace the insert statement builder.
    pub fn with_builder(mut self, builder: impl StatementBuilder + Send + Sync + 'static) -> Self {
        self.builder = Box::new(builder);
        self
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// State the most recent load ended in; `Idle` before the first one.
    pub fn state(&self) -> LoadState {
        self.state.get()
    }

    /// Load every record `parser` reads from `source` into `table`.
    ///
    /// Returns the number of inserted rows. If some rows were rejected the
    /// result is [`LoadError::RowErrors`], which still carries the count of
    /// rows that made it in. The prepared statement is closed on every path.
    pub fn load<'a, R: BufRead + 'a>(
        &self,
        conn: &dyn Connection,
        table: &str,
        parser: &'a dyn RecordParser,
        source: R,
    ) -> Result<u64, LoadError> {
        let schema = parser.schema();
        let sql = self.builder.build_insert(table, schema);
        tracing::info!(table, columns = schema.len(), chunk_size = self.chunk_size.get(), "load started");
        tracing::debug!(%sql, "insert prepared");

        self.state.set(LoadState::Idle);
        let mut statement = conn.prepare(&sql).map_err(|e| {
            self.state.set(LoadState::Errored);
            LoadError::Prepare(e)
        })?;

        let mut executor = ChunkedExecutor::new(self.chunk_size);
        let result = self.run(statement.as_mut(), schema, parser.records(Box::new(source)), &mut executor);
        if matches!(&result, Err(e) if e.row_errors().is_none()) {
            executor.fail();
        }
        self.state.set(executor.state());

        if let Err(e) = statement.close() {
            tracing::warn!(table, error = %e, "statement close failed");
        }

        match &result {
            Ok(inserted) => tracing::info!(table, inserted, "load finished"),
            Err(LoadError::RowErrors { inserted, errors }) => {
                tracing::info!(table, inserted, rejected = errors.len(), "load finished with rejected rows")
            }
            Err(e) => tracing::warn!(table, error = %e, "load aborted"),
        }
        result
    }

    fn run(
        &self,
        statement: &mut dyn Statement,
        schema: &Schema,
        records: RecordStream<'_>,
        executor: &mut ChunkedExecutor,
    ) -> Result<u64, LoadError> {
        let binder = StatementBinder::new(schema);
        let mut errors = Vec::new();
        let mut rows = 0u64;

        for record in records {
            let row = rows + 1;
            let record = record.map_err(|source| LoadError::Source { row, source })?;
            rows = row;

            schema.ensure_shape(row, &record).map_err(LoadError::SchemaMismatch)?;
            executor.begin_row(row);

            match binder.bind(statement, row, &record) {
                Ok(()) => {
                    statement.add_batch().map_err(|source| LoadError::ExecutionFailure {
                        chunk_start: executor.chunk_start(),
                        source,
                    })?;
                    executor.row_added();
                }
                Err(e) => {
                    tracing::warn!(row, column = e.column(), reason = e.reason(), error = %e.error(), "row rejected");
                    if let Err(clear) = statement.clear_parameters() {
                        tracing::warn!(row, error = %clear, "clear parameters failed");
                    }
                    errors.push(e);
                }
            }

            executor.end_row(statement)?;
        }

        let inserted = executor.finish(statement)?;
        if errors.is_empty() {
            return Ok(inserted);
        }
        let message = format!("{} of {rows} rows failed", errors.len());
        let cause = errors[0].error().clone();
        Err(LoadError::RowErrors { inserted, errors: ParseErrorSet::new(message, errors).with_cause(cause) })
    }
}

impl Default for BatchLoader {
    fn default() -> Self {
        Self::with_chunk_size(ChunkSize::MAX)
    }
}

/// Load `source` into `table`, executing a batch every `chunk_size` rows.
///
/// `chunk_size` is checked before anything is read.
pub fn load<'a, R: BufRead + 'a>(
    conn: &dyn Connection,
    table: &str,
    parser: &'a dyn RecordParser,
    source: R,
    chunk_size: i64,
) -> Result<u64, LoadError> {
    BatchLoader::new(chunk_size)?.load(conn, table, parser, source)
}

/// Load `source` into `table` as a single batch.
pub fn load_all<'a, R: BufRead + 'a>(
    conn: &dyn Connection,
    table: &str,
    parser: &'a dyn RecordParser,
    source: R,
) -> Result<u64, LoadError> {
    BatchLoader::default().load(conn, table, parser, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::error::Error;
    use std::io::Cursor;
    use tabload_api::{Column, DriverError, Record, ValueKind};

    /// Whitespace-separated fields, one record per line.
    struct Words(Schema);

    impl RecordParser for Words {
        fn schema(&self) -> &Schema {
            &self.0
        }

        fn records<'a>(&'a self, source: Box<dyn std::io::BufRead + 'a>) -> RecordStream<'a> {
            Box::new(source.lines().map(|line| line.map(|l| l.split_whitespace().collect::<Record>())))
        }
    }

    #[derive(Default)]
    struct Log {
        sql: RefCell<Vec<String>>,
        flushes: RefCell<Vec<usize>>,
        closed: RefCell<bool>,
        fail_prepare: bool,
        fail_add_batch: bool,
    }

    struct LogStatement<'l> {
        log: &'l Log,
        queued: usize,
    }

    impl Connection for Log {
        fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError> {
            if self.fail_prepare {
                return Err(DriverError::new("no such table: missing"));
            }
            self.sql.borrow_mut().push(sql.to_string());
            Ok(Box::new(LogStatement { log: self, queued: 0 }))
        }
    }

    impl Statement for LogStatement<'_> {
        fn parameter_count(&self) -> usize {
            2
        }
        fn set_int(&mut self, _: usize, _: i64) -> Result<(), DriverError> {
            Ok(())
        }
        fn set_double(&mut self, _: usize, _: f64) -> Result<(), DriverError> {
            Ok(())
        }
        fn set_string(&mut self, _: usize, _: &str) -> Result<(), DriverError> {
            Ok(())
        }
        fn set_null(&mut self, _: usize, _: ValueKind) -> Result<(), DriverError> {
            Ok(())
        }
        fn clear_parameters(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn add_batch(&mut self) -> Result<(), DriverError> {
            if self.log.fail_add_batch {
                return Err(DriverError::new("out of memory"));
            }
            self.queued += 1;
            Ok(())
        }
        fn execute(&mut self) -> Result<u64, DriverError> {
            Ok(1)
        }
        fn execute_batch(&mut self) -> Result<Vec<u64>, DriverError> {
            let n = std::mem::take(&mut self.queued);
            self.log.flushes.borrow_mut().push(n);
            Ok(vec![1; n])
        }
        fn close(&mut self) -> Result<(), DriverError> {
            *self.log.closed.borrow_mut() = true;
            Ok(())
        }
        fn is_closed(&self) -> bool {
            *self.log.closed.borrow()
        }
    }

    fn words() -> Words {
        Words(Schema::new(vec![Column::int(0, "int_val"), Column::text(1, "label")]).unwrap())
    }

    #[test]
    fn rejected_row_is_skipped_and_reported() {
        let log = Log::default();
        let err = load(&log, "test", &words(), Cursor::new("1 a\nx b\n3 c\n"), 2).unwrap_err();

        assert_eq!(log.sql.borrow().as_slice(), ["INSERT INTO test (int_val, label) VALUES (?, ?)"]);
        assert_eq!(log.flushes.borrow().as_slice(), [1, 1]);
        assert!(*log.closed.borrow());

        assert_eq!(err.inserted(), 2);
        let errors = err.row_errors().unwrap();
        assert_eq!(errors.message(), "1 of 3 rows failed");
        let e = &errors.errors()[0];
        assert_eq!((e.row(), e.column(), e.raw(), e.reason()), (2, "int_val", "x", "conversion"));
        assert_eq!(errors.source().map(ToString::to_string), Some(e.error().to_string()));
    }

    #[test]
    fn state_follows_each_load() {
        let log = Log::default();
        let loader = BatchLoader::new(2).unwrap();
        assert_eq!(loader.state(), LoadState::Idle);

        loader.load(&log, "test", &words(), Cursor::new("1 a
")).unwrap();
        assert_eq!(loader.state(), LoadState::Done);

        loader.load(&log, "test", &words(), Cursor::new("x a
")).unwrap_err();
        assert_eq!(loader.state(), LoadState::Done);

        loader.load(&log, "test", &words(), Cursor::new("1 a b
")).unwrap_err();
        assert_eq!(loader.state(), LoadState::Errored);

        loader.load(&log, "test", &words(), Cursor::new("")).unwrap();
        assert_eq!(loader.state(), LoadState::Done);
    }

    #[test]
    fn add_batch_failure_is_fatal() {
        let log = Log { fail_add_batch: true, ..Default::default() };
        let loader = BatchLoader::new(5).unwrap();
        let err = loader.load(&log, "test", &words(), Cursor::new("1 a
2 b
")).unwrap_err();
        match err {
            LoadError::ExecutionFailure { chunk_start, source } => {
                assert_eq!(chunk_start, 1);
                assert_eq!(source.message(), "out of memory");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(loader.state(), LoadState::Errored);
        assert!(*log.closed.borrow());
    }

    #[test]
    fn invalid_chunk_size_is_rejected_up_front() {
        let log = Log::default();
        let err = load(&log, "test", &words(), Cursor::new("1 a\n"), 0).unwrap_err();
        assert!(matches!(err, LoadError::InvalidChunkSize(0)));
        assert!(log.sql.borrow().is_empty());
    }

    #[test]
    fn load_all_flushes_once() {
        let log = Log::default();
        assert_eq!(load_all(&log, "test", &words(), Cursor::new("1 a\n2 b\n3 c\n")).unwrap(), 3);
        assert_eq!(log.flushes.borrow().as_slice(), [3]);
    }

    #[test]
    fn shape_mismatch_stops_the_load() {
        let log = Log::default();
        let err = load(&log, "test", &words(), Cursor::new("1 a\n2 b extra\n"), 10).unwrap_err();
        match err {
            LoadError::SchemaMismatch(shape) => assert_eq!((shape.row, shape.expected, shape.actual), (2, 2, 3)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(log.flushes.borrow().is_empty());
        assert!(*log.closed.borrow());
    }

    #[test]
    fn prepare_failure() {
        let log = Log { fail_prepare: true, ..Default::default() };
        let loader = BatchLoader::default();
        let err = loader.load(&log, "missing", &words(), Cursor::new("1 a\n")).unwrap_err();
        assert_eq!(err.to_string(), "prepare insert: no such table: missing");
        assert_eq!(loader.state(), LoadState::Errored);
    }

    #[test]
    fn custom_builder_is_used() {
        let log = Log::default();
        let loader = BatchLoader::default().with_builder(InsertSql::quoted());
        loader.load(&log, "test", &words(), Cursor::new("")).unwrap();
        assert_eq!(
            log.sql.borrow().as_slice(),
            ["INSERT INTO \"test\" (\"int_val\", \"label\") VALUES (?, ?)"]
        );
    }
}
