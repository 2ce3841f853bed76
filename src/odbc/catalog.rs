use odbc_api::Connection;

use super::query::cursor_to_result_set;
use crate::error::BridgeError;
use crate::results::ResultSet;

// Well-known positions in the ODBC catalog result sets: SQLTables reports
// TABLE_NAME third, SQLColumns reports COLUMN_NAME fourth.
const TABLE_NAME_IDX: usize = 2;
const COLUMN_NAME_IDX: usize = 3;

/// Names of tables (or views, per `table_type`) visible through the driver.
///
/// # Errors
///
/// Returns `BridgeError::OdbcError` if the catalog call fails.
pub(crate) fn table_names(
    conn: &Connection<'_>,
    table_type: &str,
) -> Result<Vec<String>, BridgeError> {
    let cursor = conn.tables("", "", "", table_type)?;
    Ok(names_at(cursor_to_result_set(cursor)?, TABLE_NAME_IDX))
}

/// Column names of one table, in catalog order.
///
/// # Errors
///
/// Returns `BridgeError::OdbcError` if the catalog call fails.
pub(crate) fn column_names(
    conn: &Connection<'_>,
    table: &str,
) -> Result<Vec<String>, BridgeError> {
    let cursor = conn.columns("", "", table, "%")?;
    Ok(names_at(cursor_to_result_set(cursor)?, COLUMN_NAME_IDX))
}

fn names_at(result_set: ResultSet, idx: usize) -> Vec<String> {
    result_set
        .results
        .iter()
        .filter_map(|row| row.get_by_index(idx).and_then(|v| v.as_text()))
        .map(str::to_string)
        .collect()
}
