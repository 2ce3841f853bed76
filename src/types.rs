use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or used as query parameters.
///
/// Reuse the same enum across backends so helper functions do not need to branch on driver
/// types:
/// ```rust
/// use mssql_bridge::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<chrono::NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Render the value the way it would be handed to a text-typed driver buffer.
    ///
    /// `None` means SQL NULL. Timestamps use ISO-8601 with a `T` separator, the
    /// format SQL Server and the Access driver both accept on insert.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            RowValues::Null => None,
            RowValues::Text(s) => Some(s.clone()),
            RowValues::Int(i) => Some(i.to_string()),
            RowValues::Float(f) => Some(f.to_string()),
            RowValues::Bool(b) => Some(if *b { "1".to_string() } else { "0".to_string() }),
            RowValues::Timestamp(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            RowValues::JSON(jsval) => Some(jsval.to_string()),
            RowValues::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// A SQL string and its bound parameters bundled together.
///
/// Handy for helpers that need to return both statement text and params without
/// losing alignment:
/// ```rust
/// use mssql_bridge::prelude::*;
///
/// let qp = QueryAndParams::new(
///     "INSERT INTO t (id, name) VALUES (?, ?)",
///     vec![RowValues::Int(1), RowValues::Text("alice".into())],
/// );
/// # let _ = qp;
/// ```
#[derive(Debug, Clone)]
pub struct QueryAndParams {
    /// The SQL query string
    pub query: String,
    /// The parameters to be bound to the query
    pub params: Vec<RowValues>,
}

impl QueryAndParams {
    /// Create a new `QueryAndParams` with the given query string and parameters
    pub fn new(query: impl Into<String>, params: Vec<RowValues>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    /// Create a new `QueryAndParams` with no parameters
    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_text_renders_scalars() {
        assert_eq!(RowValues::Int(42).to_text().as_deref(), Some("42"));
        assert_eq!(RowValues::Bool(true).to_text().as_deref(), Some("1"));
        assert_eq!(RowValues::Bool(false).to_text().as_deref(), Some("0"));
        assert_eq!(RowValues::Null.to_text(), None);
    }

    #[test]
    fn to_text_renders_timestamp_iso8601() {
        let dt = NaiveDateTime::parse_from_str("2024-05-01 13:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            RowValues::Timestamp(dt).to_text().as_deref(),
            Some("2024-05-01T13:30:00")
        );
    }

    #[test]
    fn as_bool_accepts_bit_ints() {
        assert_eq!(RowValues::Int(1).as_bool(), Some(&true));
        assert_eq!(RowValues::Int(0).as_bool(), Some(&false));
        assert_eq!(RowValues::Int(7).as_bool(), None);
    }
}
