use async_trait::async_trait;

use crate::error::BridgeError;
use crate::outcome::{BatchErrorMode, BatchOutcome};
use crate::results::ResultSet;
use crate::table::{BulkInsertOptions, TableData};
use crate::types::{QueryAndParams, RowValues};

/// The operation contract every backend handler implements.
///
/// Statements use bare `?` parameter markers regardless of backend; each
/// backend rewrites or binds them the way its driver expects.
#[async_trait]
pub trait SqlHandler {
    /// Whether this handle was opened read-only.
    fn is_read_only(&self) -> bool;

    /// Run a read statement and return its rows. Never gated by the
    /// read-only flag and never mutates state.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the connection or the query fails.
    async fn query(
        &self,
        statement: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, BridgeError>;

    /// Run one mutating statement (INSERT, UPDATE, DELETE, DDL) and return the
    /// number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ReadOnly` on a read-only handle, otherwise any
    /// connection or execution error.
    async fn execute(&self, statement: &str, params: &[RowValues]) -> Result<usize, BridgeError>;

    /// Run the same parameterized statement once per input row.
    ///
    /// With [`BatchErrorMode::Abort`] the rows run inside one transaction and
    /// the first failure rolls the whole batch back. With
    /// [`BatchErrorMode::Continue`] each row commits on its own and failures
    /// are recorded in the returned [`BatchOutcome`].
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ReadOnly` on a read-only handle,
    /// `BridgeError::ParameterError` if the statement has no parameter
    /// markers, and in abort mode the error that ended the batch.
    async fn iter_execute(
        &self,
        statement: &str,
        rows: &[Vec<RowValues>],
        mode: BatchErrorMode,
    ) -> Result<BatchOutcome, BridgeError>;

    /// Run a bundled query-and-params.
    ///
    /// # Errors
    ///
    /// Same as [`query`](SqlHandler::query).
    async fn query_qp(&self, qp: &QueryAndParams) -> Result<ResultSet, BridgeError> {
        self.query(&qp.query, &qp.params).await
    }

    /// Insert a row set in bulk, reshaped per the options' null policy. Returns
    /// the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ReadOnly` on a read-only handle,
    /// `BridgeError::ParameterError` for a policy that does not fit the data,
    /// otherwise any connection or execution error.
    async fn bulk_insert(
        &self,
        table: &str,
        data: &TableData,
        options: &BulkInsertOptions,
    ) -> Result<usize, BridgeError>;
}

/// Gate for mutating operations on read-only handles.
///
/// The refusal is an error rather than a silent no-op so callers cannot
/// mistake a skipped write for a completed one.
pub(crate) fn ensure_writable(read_only: bool, operation: &str) -> Result<(), BridgeError> {
    if read_only {
        tracing::warn!(operation, "refusing mutating operation on read-only handle");
        return Err(BridgeError::read_only(operation));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_handles_pass_the_gate() {
        assert!(ensure_writable(false, "execute").is_ok());
    }

    #[test]
    fn read_only_handles_are_refused() {
        let err = ensure_writable(true, "bulk_insert").unwrap_err();
        assert!(err.is_read_only());
        assert!(err.to_string().contains("bulk_insert"));
    }
}
