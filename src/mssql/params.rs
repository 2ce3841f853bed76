use std::borrow::Cow;
use tiberius::{ColumnData, Query, ToSql};

use crate::types::RowValues;

/// ToSql for RowValues for passing parameters
impl ToSql for RowValues {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            RowValues::Int(i) => ColumnData::I64(Some(*i)),
            RowValues::Float(f) => ColumnData::F64(Some(*f)),
            RowValues::Text(s) => ColumnData::String(Some(Cow::from(s.as_str()))),
            RowValues::Bool(b) => ColumnData::Bit(Some(*b)),
            RowValues::Timestamp(dt) => {
                // ISO-8601; the server casts on bind
                ColumnData::String(Some(Cow::from(
                    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
                )))
            }
            RowValues::Null => ColumnData::String(None),
            RowValues::JSON(jsval) => ColumnData::String(Some(Cow::from(jsval.to_string()))),
            RowValues::Blob(bytes) => ColumnData::Binary(Some(Cow::from(bytes.as_slice()))),
        }
    }
}

/// Bind parameters directly to the query for SQL Server.
/// Return a query builder with parameters already bound, in iteration order.
pub(crate) fn bind_markers<'a, 'p>(
    sql: &'a str,
    params: impl IntoIterator<Item = &'p RowValues>,
) -> Query<'a> {
    let mut query_builder = Query::new(sql);

    // Bind owned copies; the tiberius Query owns its parameter data
    for param in params {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => {
                let formatted = dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
                query_builder.bind(formatted);
            }
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query_builder.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_values_map_to_column_data() {
        assert!(matches!(
            RowValues::Int(5).to_sql(),
            ColumnData::I64(Some(5))
        ));
        assert!(matches!(
            RowValues::Bool(true).to_sql(),
            ColumnData::Bit(Some(true))
        ));
        assert!(matches!(RowValues::Null.to_sql(), ColumnData::String(None)));
    }

    #[test]
    fn timestamp_binds_as_iso8601_text() {
        let dt = chrono::NaiveDateTime::parse_from_str("2024-05-01 13:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        match RowValues::Timestamp(dt).to_sql() {
            ColumnData::String(Some(s)) => assert_eq!(s, "2024-05-01T13:30:00"),
            other => panic!("unexpected column data: {other:?}"),
        }
    }
}
