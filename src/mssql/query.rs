use chrono::NaiveDateTime;
use futures_util::TryStreamExt;

use super::config::MssqlClient;
use super::params::bind_markers;
use crate::error::BridgeError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Build a result set from a SQL Server query execution.
///
/// # Errors
///
/// Returns `BridgeError::ExecutionError` if execution, column metadata, or row
/// fetching fails.
pub async fn build_result_set(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, BridgeError> {
    let query_builder = bind_markers(query, params.iter());

    let mut stream = query_builder
        .query(client)
        .await
        .map_err(|e| BridgeError::ExecutionError(format!("SQL Server query error: {e}")))?;

    let columns_opt = stream
        .columns()
        .await
        .map_err(|e| BridgeError::ExecutionError(format!("SQL Server column fetch error: {e}")))?;

    let columns = columns_opt.ok_or_else(|| {
        BridgeError::ExecutionError("No columns returned from query".to_string())
    })?;

    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    // Store column names once in the result set
    result_set.set_column_names(std::sync::Arc::new(column_names));

    let mut rows_stream = stream.into_row_stream();
    while let Some(row) = rows_stream
        .try_next()
        .await
        .map_err(|e| BridgeError::ExecutionError(format!("SQL Server row fetch error: {e}")))?
    {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(extract_value(&row, i).unwrap_or(RowValues::Null));
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Extract a value from a row at a specific index.
///
/// The tiberius row API is typed per column; probe the common types in a fixed
/// order and fall back to NULL when nothing matches.
fn extract_value(row: &tiberius::Row, idx: usize) -> Option<RowValues> {
    if let Ok(Some(val)) = row.try_get::<i32, _>(idx) {
        return Some(RowValues::Int(i64::from(val)));
    }

    if let Ok(Some(val)) = row.try_get::<i64, _>(idx) {
        return Some(RowValues::Int(val));
    }

    if let Ok(Some(val)) = row.try_get::<f32, _>(idx) {
        return Some(RowValues::Float(f64::from(val)));
    }

    if let Ok(Some(val)) = row.try_get::<f64, _>(idx) {
        return Some(RowValues::Float(val));
    }

    if let Ok(Some(val)) = row.try_get::<bool, _>(idx) {
        return Some(RowValues::Bool(val));
    }

    if let Ok(Some(val)) = row.try_get::<NaiveDateTime, _>(idx) {
        return Some(RowValues::Timestamp(val));
    }

    if let Ok(Some(val)) = row.try_get::<&str, _>(idx) {
        // Text that looks like a timestamp is surfaced as one
        if val.contains('-') && (val.contains(':') || val.contains(' ')) {
            if let Ok(dt) = NaiveDateTime::parse_from_str(val, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(RowValues::Timestamp(dt));
            } else if let Ok(dt) = NaiveDateTime::parse_from_str(val, "%Y-%m-%d %H:%M:%S") {
                return Some(RowValues::Timestamp(dt));
            }
        }

        return Some(RowValues::Text(val.to_string()));
    }

    if let Ok(Some(val)) = row.try_get::<&[u8], _>(idx) {
        return Some(RowValues::Blob(val.to_vec()));
    }

    None
}

/// Convert a driver affected-row count into a usize.
///
/// # Errors
///
/// Returns `BridgeError::ExecutionError` if the count does not fit.
pub(crate) fn convert_affected_rows(rows_affected: u64) -> Result<usize, BridgeError> {
    usize::try_from(rows_affected)
        .map_err(|e| BridgeError::ExecutionError(format!("Invalid rows affected count: {e}")))
}
