// SQL Server backend - the base handler, speaking TDS via tiberius.
//
// This module is split into several sub-modules:
// - config: connection-string parsing and pool setup
// - params: binding RowValues onto tiberius queries
// - query: result extraction and result-set building
// - transaction: lightweight BEGIN/COMMIT/ROLLBACK wrapper
// - executor: DML, row-by-row batches, and chunked bulk inserts
// - handler: the public MssqlHandler tying it together

pub mod config;
pub mod executor;
pub mod handler;
pub mod params;
pub mod query;
pub mod transaction;

// Re-export the public API
pub use config::{MssqlClient, MssqlPool};
pub use handler::MssqlHandler;
pub use query::build_result_set;
pub use transaction::Tx;
