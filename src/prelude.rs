//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::connection_string::{ConnectionStrings, Environment};
pub use crate::error::BridgeError;
pub use crate::handler::SqlHandler;
pub use crate::markers::{MarkerStyle, prepare_markers};
pub use crate::outcome::{BatchErrorMode, BatchOutcome, RowFailure};
pub use crate::results::{ResultSet, Row};
pub use crate::table::{BulkInsertOptions, NullPolicy, TableData};
pub use crate::types::{QueryAndParams, RowValues};

#[cfg(feature = "mssql")]
pub use crate::mssql::{MssqlClient, MssqlHandler, MssqlPool};
#[cfg(feature = "mssql")]
pub use crate::sqlserver::SqlServerDb;

#[cfg(feature = "odbc")]
pub use crate::odbc::OdbcHandler;

#[cfg(feature = "access")]
pub use crate::access::AccessDb;
