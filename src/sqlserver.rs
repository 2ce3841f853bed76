use async_trait::async_trait;

use crate::connection_string::{ConnectionStrings, Environment};
use crate::error::BridgeError;
use crate::handler::SqlHandler;
use crate::mssql::MssqlHandler;
use crate::outcome::{BatchErrorMode, BatchOutcome};
use crate::results::ResultSet;
use crate::table::{BulkInsertOptions, TableData};
use crate::types::RowValues;

/// SQL Server facade: named per-environment constructors plus catalog queries.
///
/// ```rust,no_run
/// use mssql_bridge::prelude::*;
///
/// # async fn demo() -> Result<(), BridgeError> {
/// let strings = ConnectionStrings::from_env();
/// let db = SqlServerDb::prod(&strings).await?; // read-only by default
/// let tables = db.tables().await?;
/// # let _ = tables;
/// # Ok(()) }
/// ```
pub struct SqlServerDb {
    handler: MssqlHandler,
}

impl SqlServerDb {
    /// Connect to a named environment with an explicit read-only flag.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the connection string does not parse or pool
    /// setup fails.
    pub async fn connect(
        env: Environment,
        strings: &ConnectionStrings,
        read_only: bool,
    ) -> Result<Self, BridgeError> {
        let handler = MssqlHandler::connect(strings.get(env), read_only).await?;
        Ok(Self { handler })
    }

    /// Connect to a named environment with that environment's default
    /// read-only flag (production is read-only, the rest are writable).
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the connection string does not parse or pool
    /// setup fails.
    pub async fn for_environment(
        env: Environment,
        strings: &ConnectionStrings,
    ) -> Result<Self, BridgeError> {
        Self::connect(env, strings, env.read_only_by_default()).await
    }

    /// Production handle, read-only by default.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if connection setup fails.
    pub async fn prod(strings: &ConnectionStrings) -> Result<Self, BridgeError> {
        Self::for_environment(Environment::Prod, strings).await
    }

    /// QA handle, writable.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if connection setup fails.
    pub async fn qa(strings: &ConnectionStrings) -> Result<Self, BridgeError> {
        Self::for_environment(Environment::Qa, strings).await
    }

    /// Dev handle, writable.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if connection setup fails.
    pub async fn dev(strings: &ConnectionStrings) -> Result<Self, BridgeError> {
        Self::for_environment(Environment::Dev, strings).await
    }

    /// Local handle, writable.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if connection setup fails.
    pub async fn local(strings: &ConnectionStrings) -> Result<Self, BridgeError> {
        Self::for_environment(Environment::Local, strings).await
    }

    /// The underlying pooled handler.
    #[must_use]
    pub fn handler(&self) -> &MssqlHandler {
        &self.handler
    }

    /// User tables in the `dbo` schema, straight from `sys.tables`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the catalog query fails.
    pub async fn tables(&self) -> Result<ResultSet, BridgeError> {
        self.handler
            .query(
                "SELECT * FROM sys.tables WHERE SCHEMA_NAME(schema_id) = 'dbo';",
                &[],
            )
            .await
    }

    /// Views, straight from `sys.objects`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the catalog query fails.
    pub async fn views(&self) -> Result<ResultSet, BridgeError> {
        self.handler
            .query(
                "SELECT * FROM sys.objects WHERE type_desc = 'VIEW';",
                &[],
            )
            .await
    }

    /// The T-SQL definition of a view, or `None` if the name resolves to
    /// nothing. The name is bound as a parameter, never spliced into the
    /// statement.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the catalog query fails.
    pub async fn view_definition(&self, view_name: &str) -> Result<Option<String>, BridgeError> {
        let result_set = self
            .handler
            .query(
                "SELECT definition FROM sys.sql_modules WHERE object_id = OBJECT_ID(?);",
                &[RowValues::Text(view_name.to_string())],
            )
            .await?;
        Ok(result_set
            .results
            .first()
            .and_then(|row| row.get("definition"))
            .and_then(|v| v.as_text())
            .map(str::to_string))
    }
}

#[async_trait]
impl SqlHandler for SqlServerDb {
    fn is_read_only(&self) -> bool {
        self.handler.is_read_only()
    }

    async fn query(
        &self,
        statement: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, BridgeError> {
        self.handler.query(statement, params).await
    }

    async fn execute(&self, statement: &str, params: &[RowValues]) -> Result<usize, BridgeError> {
        self.handler.execute(statement, params).await
    }

    async fn iter_execute(
        &self,
        statement: &str,
        rows: &[Vec<RowValues>],
        mode: BatchErrorMode,
    ) -> Result<BatchOutcome, BridgeError> {
        self.handler.iter_execute(statement, rows, mode).await
    }

    async fn bulk_insert(
        &self,
        table: &str,
        data: &TableData,
        options: &BulkInsertOptions,
    ) -> Result<usize, BridgeError> {
        self.handler.bulk_insert(table, data, options).await
    }
}
