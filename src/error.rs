use thiserror::Error;

#[cfg(feature = "mssql")]
use bb8_tiberius::Error as Bb8TiberiusError;

#[cfg(feature = "odbc")]
use odbc_api;
#[cfg(feature = "mssql")]
use tiberius;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    PoolErrorMssql(#[from] bb8::RunError<Bb8TiberiusError>),

    #[cfg(feature = "odbc")]
    #[error(transparent)]
    OdbcError(#[from] odbc_api::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Read-only handle refused to run {operation}")]
    ReadOnly { operation: String },

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl BridgeError {
    /// Refusal raised by mutating operations on a handle opened read-only.
    #[must_use]
    pub fn read_only(operation: &str) -> Self {
        BridgeError::ReadOnly {
            operation: operation.to_string(),
        }
    }

    /// Whether this error is the read-only refusal.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, BridgeError::ReadOnly { .. })
    }
}
