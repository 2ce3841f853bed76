use tiberius::Query;

use super::config::MssqlClient;
use super::params::bind_markers;
use super::query::convert_affected_rows;
use crate::error::BridgeError;
use crate::types::RowValues;

/// Lightweight transaction wrapper for SQL Server.
///
/// Dropping a `Tx` without calling [`commit`](Tx::commit) or [`rollback`](Tx::rollback)
/// leaves the connection mid-transaction. Always finish the transaction explicitly.
pub struct Tx<'a> {
    client: &'a mut MssqlClient,
    open: bool,
}

/// Begin a new transaction on the provided SQL Server connection.
///
/// # Errors
///
/// Returns `BridgeError::ExecutionError` if issuing the BEGIN statement fails.
pub(crate) async fn begin_transaction(client: &mut MssqlClient) -> Result<Tx<'_>, BridgeError> {
    Query::new("BEGIN TRANSACTION")
        .execute(client)
        .await
        .map_err(|e| BridgeError::ExecutionError(format!("MSSQL begin transaction error: {e}")))?;

    Ok(Tx { client, open: true })
}

impl Tx<'_> {
    /// Execute a batch of SQL statements inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ExecutionError` if execution fails.
    pub async fn execute_batch(&mut self, sql: &str) -> Result<(), BridgeError> {
        Query::new(sql)
            .execute(self.client)
            .await
            .map_err(|e| BridgeError::ExecutionError(format!("MSSQL tx execute_batch error: {e}")))?;
        Ok(())
    }

    /// Execute a DML statement inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ExecutionError` if execution fails or the affected
    /// row count cannot be converted.
    pub async fn execute_dml<'p>(
        &mut self,
        query: &str,
        params: impl IntoIterator<Item = &'p RowValues>,
    ) -> Result<usize, BridgeError> {
        let query_builder = bind_markers(query, params);
        let exec_result = query_builder
            .execute(self.client)
            .await
            .map_err(|e| BridgeError::ExecutionError(format!("MSSQL tx execute error: {e}")))?;

        let rows_affected: u64 = exec_result.rows_affected().iter().sum();
        convert_affected_rows(rows_affected)
    }

    /// Commit the transaction.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if commit fails.
    pub async fn commit(mut self) -> Result<(), BridgeError> {
        if self.open {
            Query::new("COMMIT TRANSACTION")
                .execute(self.client)
                .await
                .map_err(|e| BridgeError::ExecutionError(format!("MSSQL commit error: {e}")))?;
            self.open = false;
        }
        Ok(())
    }

    /// Roll back the transaction.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if rollback fails.
    pub async fn rollback(mut self) -> Result<(), BridgeError> {
        if self.open {
            Query::new("ROLLBACK TRANSACTION")
                .execute(self.client)
                .await
                .map_err(|e| BridgeError::ExecutionError(format!("MSSQL rollback error: {e}")))?;
            self.open = false;
        }
        Ok(())
    }
}
