use bb8::Pool;
use bb8_tiberius::{ConnectionManager, rt};
use tiberius::Config as TiberiusConfig;

use crate::error::BridgeError;

/// Type alias for SQL Server client
pub type MssqlClient = rt::Client;

/// Type alias for the SQL Server connection pool
pub type MssqlPool = Pool<ConnectionManager>;

/// Build a connection pool from an ADO.NET-style connection string.
///
/// The string is parsed eagerly, so a malformed one fails here rather than on
/// first use. Connections themselves are only opened on checkout.
///
/// # Errors
///
/// Returns `BridgeError::MssqlError` for an unparseable connection string and
/// `BridgeError::ConnectionError` if manager or pool creation fails.
pub(crate) async fn build_pool(connection_string: &str) -> Result<MssqlPool, BridgeError> {
    let config = TiberiusConfig::from_ado_string(connection_string)?;

    let manager = ConnectionManager::build(config).map_err(|e| {
        BridgeError::ConnectionError(format!("Failed to configure SQL Server manager: {e}"))
    })?;

    let pool = Pool::builder()
        .max_size(20)
        .build(manager)
        .await
        .map_err(|e| {
            BridgeError::ConnectionError(format!("Failed to create SQL Server pool: {e}"))
        })?;

    Ok(pool)
}
