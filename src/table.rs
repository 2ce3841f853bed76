use crate::error::BridgeError;
use crate::types::RowValues;

/// Tabular data destined for a bulk insert: column names plus uniform-width rows.
///
/// This is the in-memory stand-in for a data frame. Reshaping for null handling
/// happens here, before any driver sees the rows:
/// ```rust
/// use mssql_bridge::prelude::*;
///
/// let data = TableData::new(
///     vec!["id".into(), "name".into()],
///     vec![
///         vec![RowValues::Int(1), RowValues::Text("alice".into())],
///         vec![RowValues::Int(2), RowValues::Null],
///     ],
/// )?;
/// assert_eq!(data.row_count(), 2);
/// # Ok::<(), BridgeError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    columns: Vec<String>,
    rows: Vec<Vec<RowValues>>,
}

impl TableData {
    /// Build a table from column names and rows.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ParameterError` if there are no columns or any row's
    /// width differs from the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RowValues>>) -> Result<Self, BridgeError> {
        if columns.is_empty() {
            return Err(BridgeError::ParameterError(
                "table data needs at least one column".to_string(),
            ));
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(BridgeError::ParameterError(format!(
                    "row {idx} has {} values but there are {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<RowValues>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether every non-null value in a column is `Text`.
    ///
    /// An all-null column does not count as text; there is nothing to learn the
    /// type from.
    fn column_is_text(&self, idx: usize) -> bool {
        let mut saw_value = false;
        for row in &self.rows {
            match &row[idx] {
                RowValues::Null => {}
                RowValues::Text(_) => saw_value = true,
                _ => return false,
            }
        }
        saw_value
    }

    fn with_rows(&self, rows: Vec<Vec<RowValues>>) -> TableData {
        TableData {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// How nulls in bulk-insert data are handled before the rows reach the driver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// Insert the data as-is.
    #[default]
    Preserve,
    /// Drop every row that contains at least one null.
    DropNullRows,
    /// Replace nulls with empty strings in every text column; nulls in
    /// non-text columns stay SQL NULL.
    FillTextColumns,
    /// Partition on the named column and insert in two passes: rows where the
    /// column has a value first, then the rows where it is null.
    SplitOnColumn(String),
}

impl NullPolicy {
    /// Reshape the data into the insert passes the policy calls for.
    ///
    /// At most two passes come back, and only [`NullPolicy::SplitOnColumn`]
    /// produces the second one. Passes may be empty; executors skip those.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ParameterError` when `SplitOnColumn` names a column
    /// the data does not have.
    pub fn apply(&self, data: &TableData) -> Result<Vec<TableData>, BridgeError> {
        match self {
            NullPolicy::Preserve => Ok(vec![data.clone()]),
            NullPolicy::DropNullRows => {
                let rows = data
                    .rows
                    .iter()
                    .filter(|row| !row.iter().any(RowValues::is_null))
                    .cloned()
                    .collect();
                Ok(vec![data.with_rows(rows)])
            }
            NullPolicy::FillTextColumns => {
                let text_columns: Vec<usize> = (0..data.columns.len())
                    .filter(|&idx| data.column_is_text(idx))
                    .collect();
                let rows = data
                    .rows
                    .iter()
                    .map(|row| {
                        let mut row = row.clone();
                        for &idx in &text_columns {
                            if row[idx].is_null() {
                                row[idx] = RowValues::Text(String::new());
                            }
                        }
                        row
                    })
                    .collect();
                Ok(vec![data.with_rows(rows)])
            }
            NullPolicy::SplitOnColumn(name) => {
                let idx = data.column_index(name).ok_or_else(|| {
                    BridgeError::ParameterError(format!(
                        "cannot split on '{name}': no such column"
                    ))
                })?;
                let (with_value, with_null): (Vec<_>, Vec<_>) = data
                    .rows
                    .iter()
                    .cloned()
                    .partition(|row| !row[idx].is_null());
                Ok(vec![data.with_rows(with_value), data.with_rows(with_null)])
            }
        }
    }
}

/// Options for a bulk insert.
#[derive(Debug, Clone, Default)]
pub struct BulkInsertOptions {
    /// Null handling applied to the data before insert.
    pub null_policy: NullPolicy,
    /// Wrap the insert in `SET IDENTITY_INSERT <table> ON/OFF` so explicit
    /// values can land in an identity column.
    pub identity_insert: bool,
}

impl BulkInsertOptions {
    #[must_use]
    pub fn with_null_policy(mut self, null_policy: NullPolicy) -> Self {
        self.null_policy = null_policy;
        self
    }

    #[must_use]
    pub fn with_identity_insert(mut self, identity_insert: bool) -> Self {
        self.identity_insert = identity_insert;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableData {
        TableData::new(
            vec!["id".into(), "name".into(), "score".into()],
            vec![
                vec![RowValues::Int(1), RowValues::Text("alice".into()), RowValues::Float(1.5)],
                vec![RowValues::Int(2), RowValues::Null, RowValues::Float(2.5)],
                vec![RowValues::Int(3), RowValues::Text("carol".into()), RowValues::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = TableData::new(
            vec!["a".into(), "b".into()],
            vec![vec![RowValues::Int(1)]],
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::ParameterError(_)));
    }

    #[test]
    fn rejects_empty_column_list() {
        assert!(TableData::new(vec![], vec![]).is_err());
    }

    #[test]
    fn preserve_returns_data_unchanged() {
        let data = sample();
        let passes = NullPolicy::Preserve.apply(&data).unwrap();
        assert_eq!(passes, vec![data]);
    }

    #[test]
    fn drop_null_rows_keeps_only_complete_rows() {
        let passes = NullPolicy::DropNullRows.apply(&sample()).unwrap();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].row_count(), 1);
        assert_eq!(passes[0].rows()[0][0], RowValues::Int(1));
    }

    #[test]
    fn fill_text_columns_only_touches_text() {
        let passes = NullPolicy::FillTextColumns.apply(&sample()).unwrap();
        let rows = passes[0].rows();
        // name is a text column: its null becomes an empty string
        assert_eq!(rows[1][1], RowValues::Text(String::new()));
        // score is numeric: its null stays a SQL NULL
        assert_eq!(rows[2][2], RowValues::Null);
    }

    #[test]
    fn all_null_column_is_not_treated_as_text() {
        let data = TableData::new(
            vec!["a".into()],
            vec![vec![RowValues::Null], vec![RowValues::Null]],
        )
        .unwrap();
        let passes = NullPolicy::FillTextColumns.apply(&data).unwrap();
        assert_eq!(passes[0].rows()[0][0], RowValues::Null);
    }

    #[test]
    fn split_on_column_partitions_into_two_passes() {
        let passes = NullPolicy::SplitOnColumn("name".into())
            .apply(&sample())
            .unwrap();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].row_count(), 2);
        assert_eq!(passes[1].row_count(), 1);
        assert_eq!(passes[1].rows()[0][0], RowValues::Int(2));
    }

    #[test]
    fn split_on_unknown_column_errors() {
        let err = NullPolicy::SplitOnColumn("nope".into())
            .apply(&sample())
            .unwrap_err();
        assert!(matches!(err, BridgeError::ParameterError(_)));
    }

    #[test]
    fn split_with_no_nulls_leaves_second_pass_empty() {
        let data = TableData::new(
            vec!["id".into()],
            vec![vec![RowValues::Int(1)], vec![RowValues::Int(2)]],
        )
        .unwrap();
        let passes = NullPolicy::SplitOnColumn("id".into()).apply(&data).unwrap();
        assert_eq!(passes[0].row_count(), 2);
        assert!(passes[1].is_empty());
    }
}
