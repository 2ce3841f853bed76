use odbc_api::{Connection, ConnectionOptions};

use crate::error::BridgeError;

/// Open a fresh connection through the process-wide ODBC environment.
///
/// Connections are cheap through the driver manager, and opening one per
/// operation sidesteps the thread-affinity questions a cached handle would
/// raise under `spawn_blocking`.
///
/// # Errors
///
/// Returns `BridgeError::OdbcError` if the environment or the connection
/// cannot be established.
pub(crate) fn connect(connection_string: &str) -> Result<Connection<'static>, BridgeError> {
    let environment = odbc_api::environment()?;
    let conn = environment
        .connect_with_connection_string(connection_string, ConnectionOptions::default())?;
    Ok(conn)
}
