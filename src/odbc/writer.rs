use odbc_api::Connection;
use odbc_api::buffers::{AnySliceMut, BufferDesc};

use crate::error::BridgeError;
use crate::markers::MarkerStyle;
use crate::statement::build_insert;
use crate::table::TableData;
use crate::types::RowValues;

/// What a column's driver-side buffer should hold, learned from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

/// Insert one reshaped pass through the driver's columnar bulk inserter.
///
/// The statement is prepared once with bare `?` markers, the parameter buffers
/// are described from the data, and the whole pass goes over in a single
/// array-execute. Commit handling is the caller's business.
///
/// # Errors
///
/// Returns `BridgeError::ParameterError` for mixed-type columns and
/// `BridgeError::OdbcError` for driver failures.
pub(crate) fn insert_pass(
    conn: &Connection<'_>,
    table: &str,
    data: &TableData,
) -> Result<usize, BridgeError> {
    if data.is_empty() {
        return Ok(0);
    }

    let kinds = column_kinds(data);
    let descriptions: Vec<BufferDesc> = kinds
        .iter()
        .enumerate()
        .map(|(idx, kind)| buffer_desc(*kind, idx, data))
        .collect();

    let sql = build_insert(table, data.columns(), 1, MarkerStyle::Question);
    let prepared = conn.prepare(&sql)?;
    let mut inserter = prepared.into_column_inserter(data.row_count(), descriptions)?;
    inserter.set_num_rows(data.row_count());

    for (col_idx, kind) in kinds.iter().enumerate() {
        let column_name = &data.columns()[col_idx];
        match (kind, inserter.column_mut(col_idx)) {
            (ColumnKind::Int, AnySliceMut::NullableI64(mut col)) => {
                for (row_idx, row) in data.rows().iter().enumerate() {
                    let cell = match &row[col_idx] {
                        RowValues::Null => None,
                        RowValues::Int(i) => Some(*i),
                        other => return Err(mixed_type(column_name, other)),
                    };
                    col.set_cell(row_idx, cell);
                }
            }
            (ColumnKind::Float, AnySliceMut::NullableF64(mut col)) => {
                for (row_idx, row) in data.rows().iter().enumerate() {
                    let cell = match &row[col_idx] {
                        RowValues::Null => None,
                        RowValues::Float(f) => Some(*f),
                        other => return Err(mixed_type(column_name, other)),
                    };
                    col.set_cell(row_idx, cell);
                }
            }
            (ColumnKind::Bool, AnySliceMut::NullableBit(mut col)) => {
                for (row_idx, row) in data.rows().iter().enumerate() {
                    let cell = match &row[col_idx] {
                        RowValues::Null => None,
                        RowValues::Bool(b) => Some(odbc_api::Bit(u8::from(*b))),
                        other => return Err(mixed_type(column_name, other)),
                    };
                    col.set_cell(row_idx, cell);
                }
            }
            (ColumnKind::Text, AnySliceMut::Text(mut col)) => {
                for (row_idx, row) in data.rows().iter().enumerate() {
                    let text = row[col_idx].to_text();
                    col.set_cell(row_idx, text.as_deref().map(str::as_bytes));
                }
            }
            _ => {
                return Err(BridgeError::ExecutionError(format!(
                    "unexpected driver buffer layout for column '{column_name}'"
                )));
            }
        }
    }

    inserter.execute()?;
    Ok(data.row_count())
}

/// Decide each column's buffer kind from its first non-null value; a column
/// with no typed value falls back to text.
fn column_kinds(data: &TableData) -> Vec<ColumnKind> {
    (0..data.columns().len())
        .map(|idx| {
            data.rows()
                .iter()
                .find_map(|row| match &row[idx] {
                    RowValues::Null => None,
                    RowValues::Int(_) => Some(ColumnKind::Int),
                    RowValues::Float(_) => Some(ColumnKind::Float),
                    RowValues::Bool(_) => Some(ColumnKind::Bool),
                    _ => Some(ColumnKind::Text),
                })
                .unwrap_or(ColumnKind::Text)
        })
        .collect()
}

fn buffer_desc(kind: ColumnKind, idx: usize, data: &TableData) -> BufferDesc {
    match kind {
        ColumnKind::Int => BufferDesc::I64 { nullable: true },
        ColumnKind::Float => BufferDesc::F64 { nullable: true },
        ColumnKind::Bool => BufferDesc::Bit { nullable: true },
        ColumnKind::Text => BufferDesc::Text {
            max_str_len: data
                .rows()
                .iter()
                .filter_map(|row| row[idx].to_text().map(|s| s.len()))
                .max()
                .unwrap_or(0)
                .max(1),
        },
    }
}

fn mixed_type(column: &str, value: &RowValues) -> BridgeError {
    BridgeError::ParameterError(format!(
        "column '{column}' mixes value types; got {value:?} after inferring a different kind"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_come_from_first_non_null_value() {
        let data = TableData::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![
                vec![RowValues::Null, RowValues::Float(0.5), RowValues::Bool(true), RowValues::Null],
                vec![RowValues::Int(1), RowValues::Null, RowValues::Bool(false), RowValues::Null],
            ],
        )
        .unwrap();
        assert_eq!(
            column_kinds(&data),
            vec![ColumnKind::Int, ColumnKind::Float, ColumnKind::Bool, ColumnKind::Text]
        );
    }

    #[test]
    fn text_buffers_are_sized_to_the_longest_cell() {
        let data = TableData::new(
            vec!["t".into()],
            vec![
                vec![RowValues::Text("ab".into())],
                vec![RowValues::Text("abcdef".into())],
                vec![RowValues::Null],
            ],
        )
        .unwrap();
        assert_eq!(
            buffer_desc(ColumnKind::Text, 0, &data),
            BufferDesc::Text { max_str_len: 6 }
        );
    }

    #[test]
    fn all_null_text_buffer_has_nonzero_len() {
        let data = TableData::new(vec!["t".into()], vec![vec![RowValues::Null]]).unwrap();
        assert_eq!(
            buffer_desc(ColumnKind::Text, 0, &data),
            BufferDesc::Text { max_str_len: 1 }
        );
    }
}
