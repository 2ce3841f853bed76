use async_trait::async_trait;
use bb8::PooledConnection;
use bb8_tiberius::ConnectionManager;
use tracing::debug;

use super::config::{MssqlPool, build_pool};
use super::{executor, query};
use crate::error::BridgeError;
use crate::handler::{SqlHandler, ensure_writable};
use crate::markers::{MarkerStyle, prepare_markers};
use crate::outcome::{BatchErrorMode, BatchOutcome};
use crate::results::ResultSet;
use crate::table::{BulkInsertOptions, TableData};
use crate::types::RowValues;

/// The base handler: SQL Server over TDS, pooled.
///
/// Constructed from an ADO.NET-style connection string plus a read-only flag.
/// Statements use bare `?` markers; they are rewritten to `@PN` before hitting
/// the wire.
/// ```rust,no_run
/// use mssql_bridge::prelude::*;
///
/// # async fn demo() -> Result<(), BridgeError> {
/// let db = MssqlHandler::connect(
///     "Server=tcp:localhost,1433;Database=app;User Id=sa;Password=pw;TrustServerCertificate=true",
///     false,
/// )
/// .await?;
/// let rows = db.query("SELECT name FROM users WHERE id = ?", &[RowValues::Int(1)]).await?;
/// # let _ = rows;
/// # Ok(()) }
/// ```
pub struct MssqlHandler {
    pool: MssqlPool,
    read_only: bool,
}

impl MssqlHandler {
    /// Build a pooled handler from a connection string.
    ///
    /// The string is validated here; connections are opened lazily on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the connection string does not parse or the
    /// pool cannot be set up.
    pub async fn connect(connection_string: &str, read_only: bool) -> Result<Self, BridgeError> {
        let pool = build_pool(connection_string).await?;
        Ok(Self { pool, read_only })
    }

    /// Same handler with the read-only flag replaced.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    async fn conn(&self) -> Result<PooledConnection<'_, ConnectionManager>, BridgeError> {
        self.pool.get().await.map_err(BridgeError::PoolErrorMssql)
    }

    fn checked_statement<'a>(
        statement: &'a str,
        params_len: usize,
    ) -> Result<std::borrow::Cow<'a, str>, BridgeError> {
        let (sql, marker_count) = prepare_markers(statement, MarkerStyle::AtP);
        if marker_count != params_len {
            return Err(BridgeError::ParameterError(format!(
                "statement has {marker_count} markers but {params_len} parameters were supplied"
            )));
        }
        Ok(sql)
    }
}

#[async_trait]
impl SqlHandler for MssqlHandler {
    fn is_read_only(&self) -> bool {
        self.read_only
    }

    async fn query(
        &self,
        statement: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, BridgeError> {
        let sql = Self::checked_statement(statement, params.len())?;
        let mut conn = self.conn().await?;
        query::build_result_set(&mut conn, &sql, params).await
    }

    async fn execute(&self, statement: &str, params: &[RowValues]) -> Result<usize, BridgeError> {
        ensure_writable(self.read_only, "execute")?;
        let sql = Self::checked_statement(statement, params.len())?;
        let mut conn = self.conn().await?;
        executor::execute_dml(&mut conn, &sql, params).await
    }

    async fn iter_execute(
        &self,
        statement: &str,
        rows: &[Vec<RowValues>],
        mode: BatchErrorMode,
    ) -> Result<BatchOutcome, BridgeError> {
        ensure_writable(self.read_only, "iter_execute")?;
        let (sql, marker_count) = prepare_markers(statement, MarkerStyle::AtP);
        if marker_count == 0 {
            return Err(BridgeError::ParameterError(
                "iter_execute statement must be parameterized".to_string(),
            ));
        }
        let mut conn = self.conn().await?;
        executor::iter_execute(&mut conn, &sql, marker_count, rows, mode).await
    }

    async fn bulk_insert(
        &self,
        table: &str,
        data: &TableData,
        options: &BulkInsertOptions,
    ) -> Result<usize, BridgeError> {
        ensure_writable(self.read_only, "bulk_insert")?;
        let passes = options.null_policy.apply(data)?;
        let mut conn = self.conn().await?;
        let mut inserted = 0usize;
        for pass in &passes {
            inserted +=
                executor::insert_pass(&mut conn, table, pass, options.identity_insert).await?;
        }
        debug!(table, rows = inserted, passes = passes.len(), "bulk insert finished");
        Ok(inserted)
    }
}
