use tabload_api::Statement;

use crate::config::ChunkSize;
use crate::error::LoadError;

/// Where a load stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing read yet.
    Idle,
    /// Rows are being added to the open window.
    Accumulating,
    /// The window is being executed.
    Flushing,
    /// Every window has been executed.
    Done,
    /// The load stopped on a fatal error; nothing more will be executed.
    Errored,
}

/// Counts input rows into windows of `chunk_size` and executes the
/// statement batch once per window.
///
/// A window covers input rows whether they bound or not, so a window
/// whose rows all failed has nothing pending and is skipped.
pub(crate) struct ChunkedExecutor {
    chunk_size: ChunkSize,
    state: LoadState,
    window_start: u64,
    window_rows: usize,
    pending: usize,
    total: u64,
}

impl ChunkedExecutor {
    pub(crate) fn new(chunk_size: ChunkSize) -> Self {
        Self {
            chunk_size,
            state: LoadState::Idle,
            window_start: 0,
            window_rows: 0,
            pending: 0,
            total: 0,
        }
    }

    pub(crate) fn state(&self) -> LoadState {
        self.state
    }

    /// A fatal error stopped the load.
    pub(crate) fn fail(&mut self) {
        self.state = LoadState::Errored;
    }

    /// First input row of the open window.
    pub(crate) fn chunk_start(&self) -> u64 {
        self.window_start
    }

    /// Mark the start of input row `row` (1-based).
    pub(crate) fn begin_row(&mut self, row: u64) {
        if self.window_rows == 0 {
            self.window_start = row;
        }
        self.state = LoadState::Accumulating;
    }

    /// The current row was added to the statement batch.
    pub(crate) fn row_added(&mut self) {
        self.pending += 1;
    }

    /// Close the current row; flushes when the window is full.
    pub(crate) fn end_row(&mut self, statement: &mut dyn Statement) -> Result<(), LoadError> {
        self.window_rows += 1;
        if self.window_rows >= self.chunk_size.get() {
            self.flush(statement)?;
        }
        Ok(())
    }

    /// Flush what remains and return the total.
    pub(crate) fn finish(&mut self, statement: &mut dyn Statement) -> Result<u64, LoadError> {
        self.flush(statement)?;
        self.state = LoadState::Done;
        Ok(self.total)
    }

    fn flush(&mut self, statement: &mut dyn Statement) -> Result<(), LoadError> {
        let rows = std::mem::take(&mut self.window_rows);
        let pending = std::mem::take(&mut self.pending);
        if pending == 0 {
            return Ok(());
        }

        self.state = LoadState::Flushing;
        let counts = statement.execute_batch().map_err(|source| {
            self.state = LoadState::Errored;
            LoadError::ExecutionFailure { chunk_start: self.window_start, source }
        })?;
        let inserted: u64 = counts.iter().sum();
        self.total += inserted;
        tracing::debug!(chunk_start = self.window_start, rows, pending, inserted, "chunk executed");
        self.state = LoadState::Accumulating;
        Ok(())
    }
}
