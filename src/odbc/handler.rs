use async_trait::async_trait;
use odbc_api::Connection;
use tracing::{debug, warn};

use super::{catalog, connection, params, query, writer};
use crate::error::BridgeError;
use crate::handler::{SqlHandler, ensure_writable};
use crate::markers::{MarkerStyle, prepare_markers};
use crate::outcome::{BatchErrorMode, BatchOutcome};
use crate::results::ResultSet;
use crate::statement::set_identity_insert;
use crate::table::{BulkInsertOptions, TableData};
use crate::types::RowValues;

/// The alternate handler: any ODBC data source, including Microsoft Access.
///
/// Same contract as [`MssqlHandler`](crate::mssql::MssqlHandler), but every
/// operation opens a fresh driver-manager connection and runs on the blocking
/// thread pool. Statements keep their bare `?` markers; that is the native
/// ODBC form.
pub struct OdbcHandler {
    connection_string: String,
    read_only: bool,
}

impl OdbcHandler {
    /// Wrap an ODBC connection string. Nothing connects until the first
    /// operation runs.
    pub fn new(connection_string: impl Into<String>, read_only: bool) -> Self {
        Self {
            connection_string: connection_string.into(),
            read_only,
        }
    }

    /// The connection string this handler opens connections with.
    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Same handler with the read-only flag replaced.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Open a connection and run `f` on the blocking pool.
    pub(crate) async fn run_blocking<T, F>(&self, f: F) -> Result<T, BridgeError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection<'static>) -> Result<T, BridgeError> + Send + 'static,
    {
        let connection_string = self.connection_string.clone();
        tokio::task::spawn_blocking(move || {
            let conn = connection::connect(&connection_string)?;
            f(&conn)
        })
        .await
        .map_err(|e| BridgeError::ExecutionError(format!("blocking task join error: {e}")))?
    }

    /// Table names visible through the driver, filtered by catalog table type
    /// (`"TABLE"`, `"VIEW"`, ...).
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::OdbcError` if the catalog call fails.
    pub async fn table_names(&self, table_type: &str) -> Result<Vec<String>, BridgeError> {
        let table_type = table_type.to_string();
        self.run_blocking(move |conn| catalog::table_names(conn, &table_type))
            .await
    }

    /// Column names of one table, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::OdbcError` if the catalog call fails.
    pub async fn column_names(&self, table: &str) -> Result<Vec<String>, BridgeError> {
        let table = table.to_string();
        self.run_blocking(move |conn| catalog::column_names(conn, &table))
            .await
    }

    fn checked_statement(
        statement: &str,
        params_len: usize,
    ) -> Result<(String, usize), BridgeError> {
        let (sql, marker_count) = prepare_markers(statement, MarkerStyle::Question);
        if marker_count != params_len {
            return Err(BridgeError::ParameterError(format!(
                "statement has {marker_count} markers but {params_len} parameters were supplied"
            )));
        }
        Ok((sql.into_owned(), marker_count))
    }
}

#[async_trait]
impl SqlHandler for OdbcHandler {
    fn is_read_only(&self) -> bool {
        self.read_only
    }

    async fn query(
        &self,
        statement: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, BridgeError> {
        let (sql, _) = Self::checked_statement(statement, params.len())?;
        let params = params.to_vec();
        self.run_blocking(move |conn| {
            let odbc_params = params::to_odbc_params(&params);
            match conn.execute(&sql, odbc_params.as_slice(), None)? {
                Some(cursor) => query::cursor_to_result_set(cursor),
                None => Ok(ResultSet::default()),
            }
        })
        .await
    }

    async fn execute(&self, statement: &str, params: &[RowValues]) -> Result<usize, BridgeError> {
        ensure_writable(self.read_only, "execute")?;
        let (sql, _) = Self::checked_statement(statement, params.len())?;
        let params = params.to_vec();
        self.run_blocking(move |conn| {
            let odbc_params = params::to_odbc_params(&params);
            let mut stmt = conn.preallocate()?;
            stmt.execute(&sql, odbc_params.as_slice())?;
            Ok(stmt.row_count()?.unwrap_or(0))
        })
        .await
    }

    async fn iter_execute(
        &self,
        statement: &str,
        rows: &[Vec<RowValues>],
        mode: BatchErrorMode,
    ) -> Result<BatchOutcome, BridgeError> {
        ensure_writable(self.read_only, "iter_execute")?;
        let (sql, marker_count) = prepare_markers(statement, MarkerStyle::Question);
        if marker_count == 0 {
            return Err(BridgeError::ParameterError(
                "iter_execute statement must be parameterized".to_string(),
            ));
        }
        let sql = sql.into_owned();
        let rows = rows.to_vec();
        self.run_blocking(move |conn| run_batch(conn, &sql, marker_count, &rows, mode))
            .await
    }

    async fn bulk_insert(
        &self,
        table: &str,
        data: &TableData,
        options: &BulkInsertOptions,
    ) -> Result<usize, BridgeError> {
        ensure_writable(self.read_only, "bulk_insert")?;
        let passes = options.null_policy.apply(data)?;
        let table = table.to_string();
        let identity_insert = options.identity_insert;
        self.run_blocking(move |conn| {
            // one manual-commit transaction per bulk call, like the statement path
            conn.set_autocommit(false)?;
            match run_bulk_passes(conn, &table, &passes, identity_insert) {
                Ok(inserted) => {
                    conn.commit()?;
                    debug!(table = %table, rows = inserted, "bulk insert finished");
                    Ok(inserted)
                }
                Err(e) => {
                    conn.rollback()?;
                    Err(e)
                }
            }
        })
        .await
    }
}

fn run_batch(
    conn: &Connection<'_>,
    sql: &str,
    marker_count: usize,
    rows: &[Vec<RowValues>],
    mode: BatchErrorMode,
) -> Result<BatchOutcome, BridgeError> {
    debug!(rows = rows.len(), ?mode, "running row-by-row batch");
    match mode {
        BatchErrorMode::Abort => {
            conn.set_autocommit(false)?;
            let mut outcome = BatchOutcome::default();
            for (idx, row) in rows.iter().enumerate() {
                if let Err(e) = check_row_width(idx, row, marker_count) {
                    conn.rollback()?;
                    return Err(e);
                }
                let odbc_params = params::to_odbc_params(row);
                if let Err(e) = conn.execute(sql, odbc_params.as_slice(), None) {
                    conn.rollback()?;
                    return Err(BridgeError::ExecutionError(format!(
                        "batch aborted and rolled back at row {idx}: {e}"
                    )));
                }
                outcome.record_success();
            }
            conn.commit()?;
            Ok(outcome)
        }
        BatchErrorMode::Continue => {
            let mut outcome = BatchOutcome::default();
            for (idx, row) in rows.iter().enumerate() {
                if let Err(e) = check_row_width(idx, row, marker_count) {
                    warn!(row = idx, "skipping row: {e}");
                    outcome.record_failure(idx, e.to_string());
                    continue;
                }
                let odbc_params = params::to_odbc_params(row);
                match conn.execute(sql, odbc_params.as_slice(), None) {
                    Ok(_) => outcome.record_success(),
                    Err(e) => {
                        warn!(row = idx, "row failed, continuing: {e}");
                        outcome.record_failure(idx, e.to_string());
                    }
                }
            }
            Ok(outcome)
        }
    }
}

fn run_bulk_passes(
    conn: &Connection<'_>,
    table: &str,
    passes: &[TableData],
    identity_insert: bool,
) -> Result<usize, BridgeError> {
    if identity_insert {
        conn.execute(&set_identity_insert(table, true), (), None)?;
    }
    let mut inserted = 0usize;
    for pass in passes {
        inserted += writer::insert_pass(conn, table, pass)?;
    }
    if identity_insert {
        conn.execute(&set_identity_insert(table, false), (), None)?;
    }
    Ok(inserted)
}

fn check_row_width(idx: usize, row: &[RowValues], marker_count: usize) -> Result<(), BridgeError> {
    if row.len() != marker_count {
        return Err(BridgeError::ParameterError(format!(
            "row {idx} has {} values but the statement has {marker_count} markers",
            row.len()
        )));
    }
    Ok(())
}
