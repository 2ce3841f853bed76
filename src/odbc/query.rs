use std::sync::Arc;

use odbc_api::buffers::TextRowSet;
use odbc_api::{Cursor, ResultSetMetadata};

use crate::error::BridgeError;
use crate::results::ResultSet;
use crate::types::RowValues;

// Rows fetched per driver round trip, and the per-cell text ceiling. Anything
// longer than the ceiling is truncated by the driver.
const BATCH_SIZE: usize = 1024;
const MAX_TEXT_LEN: usize = 4096;

/// Drain a cursor into a `ResultSet` through a buffered text fetch.
///
/// Every non-null cell surfaces as `RowValues::Text`; this backend reads
/// whatever the driver can render as text, which is how the Access driver is
/// usually consumed anyway.
///
/// # Errors
///
/// Returns `BridgeError::OdbcError` if metadata, binding, or fetching fails.
pub(crate) fn cursor_to_result_set(mut cursor: impl Cursor) -> Result<ResultSet, BridgeError> {
    let column_names = cursor
        .column_names()?
        .collect::<Result<Vec<String>, _>>()?;

    let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))?;
    let mut block_cursor = cursor.bind_buffer(&mut buffers)?;

    let mut result_set = ResultSet::with_capacity(BATCH_SIZE);
    result_set.set_column_names(Arc::new(column_names));

    while let Some(batch) = block_cursor.fetch()? {
        for row_index in 0..batch.num_rows() {
            let row_values = (0..batch.num_cols())
                .map(|col_index| match batch.at(col_index, row_index) {
                    Some(bytes) => RowValues::Text(String::from_utf8_lossy(bytes).into_owned()),
                    None => RowValues::Null,
                })
                .collect();
            result_set.add_row_values(row_values);
        }
    }

    Ok(result_set)
}
