use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::BridgeError;
use crate::handler::SqlHandler;
use crate::odbc::{OdbcHandler, catalog};
use crate::outcome::{BatchErrorMode, BatchOutcome};
use crate::results::ResultSet;
use crate::table::{BulkInsertOptions, TableData};
use crate::types::RowValues;

/// Microsoft Access facade: the handler contract over an `.mdb`/`.accdb` file,
/// plus catalog and file introspection.
///
/// ```rust,no_run
/// use mssql_bridge::prelude::*;
///
/// # async fn demo() -> Result<(), BridgeError> {
/// let db = AccessDb::open(r"C:\data", "inventory.accdb", None)?;
/// println!("{} bytes, modified {}", db.size_bytes(), db.modified());
/// let tables = db.tables().await?;
/// # let _ = tables;
/// # Ok(()) }
/// ```
pub struct AccessDb {
    handler: OdbcHandler,
    path: PathBuf,
    size_bytes: u64,
    modified: DateTime<Local>,
}

impl AccessDb {
    /// Open a database file. Builds the Access driver connection string and
    /// captures the file's size and modification time; the file itself is only
    /// read once an operation runs.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConfigError` if the file does not exist or its
    /// metadata cannot be read.
    pub fn open(
        directory: impl AsRef<Path>,
        file_name: &str,
        password: Option<&str>,
    ) -> Result<Self, BridgeError> {
        let path = directory.as_ref().join(file_name);
        let metadata = std::fs::metadata(&path).map_err(|e| {
            BridgeError::ConfigError(format!(
                "cannot stat Access database {}: {e}",
                path.display()
            ))
        })?;
        if !metadata.is_file() {
            return Err(BridgeError::ConfigError(format!(
                "{} is not a file",
                path.display()
            )));
        }
        let modified = metadata.modified().map_err(|e| {
            BridgeError::ConfigError(format!(
                "cannot read modification time of {}: {e}",
                path.display()
            ))
        })?;

        let mut connection_string = format!(
            "Driver={{Microsoft Access Driver (*.mdb, *.accdb)}};DBQ={};",
            path.display()
        );
        if let Some(password) = password {
            connection_string.push_str(&format!("PWD={password};"));
        }

        Ok(Self {
            handler: OdbcHandler::new(connection_string, false),
            path,
            size_bytes: metadata.len(),
            modified: DateTime::<Local>::from(modified),
        })
    }

    /// The underlying ODBC handler.
    #[must_use]
    pub fn handler(&self) -> &OdbcHandler {
        &self.handler
    }

    /// Full path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes, captured at open.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File modification time, captured at open.
    #[must_use]
    pub fn modified(&self) -> DateTime<Local> {
        self.modified
    }

    /// User table names.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::OdbcError` if the catalog call fails.
    pub async fn tables(&self) -> Result<Vec<String>, BridgeError> {
        self.handler.table_names("TABLE").await
    }

    /// View names, as far as the driver reports them.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::OdbcError` if the catalog call fails.
    pub async fn views(&self) -> Result<Vec<String>, BridgeError> {
        self.handler.table_names("VIEW").await
    }

    /// Column names of one table, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::OdbcError` if the catalog call fails.
    pub async fn table_columns(&self, table: &str) -> Result<Vec<String>, BridgeError> {
        self.handler.column_names(table).await
    }

    /// Every user table's columns, fetched over a single connection.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::OdbcError` if any catalog call fails.
    pub async fn all_columns(&self) -> Result<BTreeMap<String, Vec<String>>, BridgeError> {
        self.handler
            .run_blocking(|conn| {
                let mut all = BTreeMap::new();
                for table in catalog::table_names(conn, "TABLE")? {
                    let columns = catalog::column_names(conn, &table)?;
                    all.insert(table, columns);
                }
                Ok(all)
            })
            .await
    }

    /// Access exposes no view definition text through ODBC.
    ///
    /// # Errors
    ///
    /// Always returns `BridgeError::Unimplemented`.
    pub async fn view_definition(&self, _view_name: &str) -> Result<String, BridgeError> {
        Err(BridgeError::Unimplemented(
            "the Access driver does not expose view definitions".to_string(),
        ))
    }
}

#[async_trait]
impl SqlHandler for AccessDb {
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
