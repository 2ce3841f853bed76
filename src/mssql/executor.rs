use tracing::{debug, warn};

use super::config::MssqlClient;
use super::params::bind_markers;
use super::query::convert_affected_rows;
use super::transaction::{Tx, begin_transaction};
use crate::error::BridgeError;
use crate::markers::MarkerStyle;
use crate::outcome::{BatchErrorMode, BatchOutcome};
use crate::statement::{build_insert, set_identity_insert};
use crate::table::TableData;
use crate::types::RowValues;

// SQL Server caps one RPC at 2100 parameters and one VALUES clause at 1000 rows.
const MAX_RPC_PARAMS: usize = 2100;
const MAX_VALUES_ROWS: usize = 1000;

/// Execute a single DML statement and return the number of rows affected.
///
/// # Errors
///
/// Returns `BridgeError::ExecutionError` if execution fails.
pub(crate) async fn execute_dml(
    client: &mut MssqlClient,
    sql: &str,
    params: &[RowValues],
) -> Result<usize, BridgeError> {
    let query_builder = bind_markers(sql, params.iter());

    let exec_result = query_builder
        .execute(client)
        .await
        .map_err(|e| BridgeError::ExecutionError(format!("SQL Server DML execution error: {e}")))?;

    let rows_affected: u64 = exec_result.rows_affected().iter().sum();
    convert_affected_rows(rows_affected)
}

/// Run the same statement once per row.
///
/// Abort mode wraps the whole batch in one transaction and rolls back on the
/// first failure. Continue mode leaves autocommit on so every row stands on its
/// own, and failed rows are recorded instead of propagated.
pub(crate) async fn iter_execute(
    client: &mut MssqlClient,
    sql: &str,
    marker_count: usize,
    rows: &[Vec<RowValues>],
    mode: BatchErrorMode,
) -> Result<BatchOutcome, BridgeError> {
    debug!(rows = rows.len(), ?mode, "running row-by-row batch");
    match mode {
        BatchErrorMode::Abort => {
            let mut tx = begin_transaction(client).await?;
            let mut outcome = BatchOutcome::default();
            for (idx, row) in rows.iter().enumerate() {
                if let Err(e) = check_row_width(idx, row, marker_count) {
                    tx.rollback().await?;
                    return Err(e);
                }
                match tx.execute_dml(sql, row.iter()).await {
                    Ok(_) => outcome.record_success(),
                    Err(e) => {
                        tx.rollback().await?;
                        return Err(BridgeError::ExecutionError(format!(
                            "batch aborted and rolled back at row {idx}: {e}"
                        )));
                    }
                }
            }
            tx.commit().await?;
            Ok(outcome)
        }
        BatchErrorMode::Continue => {
            let mut outcome = BatchOutcome::default();
            for (idx, row) in rows.iter().enumerate() {
                if let Err(e) = check_row_width(idx, row, marker_count) {
                    warn!(row = idx, "skipping row: {e}");
                    outcome.record_failure(idx, e.to_string());
                    continue;
                }
                match bind_markers(sql, row.iter()).execute(&mut *client).await {
                    Ok(_) => outcome.record_success(),
                    Err(e) => {
                        warn!(row = idx, "row failed, continuing: {e}");
                        outcome.record_failure(idx, e.to_string());
                    }
                }
            }
            Ok(outcome)
        }
    }
}

/// Insert one reshaped pass of bulk data inside its own transaction.
///
/// The rows go over in chunked multi-row `INSERT ... VALUES` statements with an
/// explicit column list, sized to stay under the server's RPC parameter and
/// VALUES-row limits.
pub(crate) async fn insert_pass(
    client: &mut MssqlClient,
    table: &str,
    data: &TableData,
    identity_insert: bool,
) -> Result<usize, BridgeError> {
    if data.is_empty() {
        return Ok(0);
    }

    let mut tx = begin_transaction(client).await?;
    match insert_pass_in_tx(&mut tx, table, data, identity_insert).await {
        Ok(inserted) => {
            tx.commit().await?;
            Ok(inserted)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

async fn insert_pass_in_tx(
    tx: &mut Tx<'_>,
    table: &str,
    data: &TableData,
    identity_insert: bool,
) -> Result<usize, BridgeError> {
    let columns = data.columns();
    let rows_per_chunk = (MAX_RPC_PARAMS / columns.len()).clamp(1, MAX_VALUES_ROWS);

    if identity_insert {
        tx.execute_batch(&set_identity_insert(table, true)).await?;
    }

    let mut inserted = 0usize;
    for chunk in data.rows().chunks(rows_per_chunk) {
        let sql = build_insert(table, columns, chunk.len(), MarkerStyle::AtP);
        inserted += tx.execute_dml(&sql, chunk.iter().flatten()).await?;
    }

    if identity_insert {
        tx.execute_batch(&set_identity_insert(table, false)).await?;
    }

    debug!(table, rows = inserted, "bulk pass inserted");
    Ok(inserted)
}

fn check_row_width(
    idx: usize,
    row: &[RowValues],
    marker_count: usize,
) -> Result<(), BridgeError> {
    if row.len() != marker_count {
        return Err(BridgeError::ParameterError(format!(
            "row {idx} has {} values but the statement has {marker_count} markers",
            row.len()
        )));
    }
    Ok(())
}
