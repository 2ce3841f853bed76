use clap::ValueEnum;
use serde::Serialize;

/// What to do when one row of an [`iter_execute`] batch fails.
///
/// [`iter_execute`]: crate::handler::SqlHandler::iter_execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchErrorMode {
    /// Abort on the first failure and roll back the whole batch.
    Abort,
    /// Commit each row independently and record failures as they happen.
    Continue,
}

/// One row that failed in a continue-on-error batch.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// Zero-based index of the input row.
    pub row_index: usize,
    /// Driver error text.
    pub message: String,
}

/// Result of an [`iter_execute`](crate::handler::SqlHandler::iter_execute) batch.
#[derive(Debug, Clone, Default, Serialize)]
#[must_use]
pub struct BatchOutcome {
    /// Rows handed to the driver.
    pub attempted: usize,
    /// Rows that executed without error.
    pub succeeded: usize,
    /// Per-row failures; empty in abort mode (the first failure ends the batch).
    pub failures: Vec<RowFailure>,
}

impl BatchOutcome {
    /// Whether every attempted row succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.attempted == self.succeeded
    }

    pub(crate) fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub(crate) fn record_failure(&mut self, row_index: usize, message: String) {
        self.attempted += 1;
        self.failures.push(RowFailure { row_index, message });
    }
}
