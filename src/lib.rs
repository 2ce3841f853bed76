//! Convenience handlers for SQL Server and Microsoft Access.
//!
//! Everything here is glue over existing drivers: open a handle from a named
//! environment's connection string, run parameterized queries, loop a
//! statement over rows, or bulk-insert tabular data with a null-handling
//! policy. The `mssql` backend speaks TDS through tiberius behind a bb8
//! pool; the `odbc` backend goes through the platform driver manager, which
//! is also how Microsoft Access databases are reached (the `access` feature).

pub mod connection_string;
pub mod error;
pub mod handler;
pub mod markers;
pub mod outcome;
pub mod results;
pub mod statement;
pub mod table;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "mssql")]
pub mod sqlserver;

#[cfg(feature = "odbc")]
pub mod odbc;

#[cfg(feature = "access")]
pub mod access;

pub mod prelude;

pub use connection_string::{ConnectionStrings, Environment};
pub use error::BridgeError;
pub use handler::SqlHandler;
pub use outcome::{BatchErrorMode, BatchOutcome, RowFailure};
pub use results::{ResultSet, Row};
pub use table::{BulkInsertOptions, NullPolicy, TableData};
pub use types::{QueryAndParams, RowValues};

#[cfg(feature = "mssql")]
pub use mssql::MssqlHandler;
#[cfg(feature = "mssql")]
pub use sqlserver::SqlServerDb;

#[cfg(feature = "odbc")]
pub use odbc::OdbcHandler;

#[cfg(feature = "access")]
pub use access::AccessDb;
