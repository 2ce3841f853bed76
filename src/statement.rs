use std::fmt::Write;

use crate::markers::MarkerStyle;

/// Quote an identifier with T-SQL brackets (also accepted by the Access driver).
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Build a multi-row `INSERT INTO t (cols) VALUES (...), (...)` statement.
///
/// With [`MarkerStyle::AtP`] the markers are numbered continuously across rows
/// (`@P1..@Pn`), matching how tiberius binds a flat parameter list. With
/// [`MarkerStyle::Question`] every slot is a bare `?`, the form an ODBC driver
/// prepares once and executes with a parameter array.
#[must_use]
pub fn build_insert(table: &str, columns: &[String], row_count: usize, style: MarkerStyle) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("INSERT INTO {} ({}) VALUES ", quote_ident(table), column_list);
    let mut marker = 0usize;
    for row in 0..row_count {
        if row > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for col in 0..columns.len() {
            if col > 0 {
                sql.push_str(", ");
            }
            match style {
                MarkerStyle::AtP => {
                    marker += 1;
                    // write! to a String cannot fail
                    let _ = write!(sql, "@P{marker}");
                }
                MarkerStyle::Question => sql.push('?'),
            }
        }
        sql.push(')');
    }
    sql.push(';');
    sql
}

/// Statement toggling `IDENTITY_INSERT` for a table.
#[must_use]
pub fn set_identity_insert(table: &str, on: bool) -> String {
    format!(
        "SET IDENTITY_INSERT {} {};",
        quote_ident(table),
        if on { "ON" } else { "OFF" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_and_escapes_identifiers() {
        assert_eq!(quote_ident("users"), "[users]");
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
    }

    #[test]
    fn single_row_insert_with_at_markers() {
        let cols = vec!["id".to_string(), "name".to_string()];
        assert_eq!(
            build_insert("users", &cols, 1, MarkerStyle::AtP),
            "INSERT INTO [users] ([id], [name]) VALUES (@P1, @P2);"
        );
    }

    #[test]
    fn multi_row_insert_numbers_markers_across_rows() {
        let cols = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            build_insert("t", &cols, 3, MarkerStyle::AtP),
            "INSERT INTO [t] ([a], [b]) VALUES (@P1, @P2), (@P3, @P4), (@P5, @P6);"
        );
    }

    #[test]
    fn question_style_repeats_bare_markers() {
        let cols = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            build_insert("t", &cols, 2, MarkerStyle::Question),
            "INSERT INTO [t] ([a], [b]) VALUES (?, ?), (?, ?);"
        );
    }

    #[test]
    fn identity_insert_toggles() {
        assert_eq!(
            set_identity_insert("users", true),
            "SET IDENTITY_INSERT [users] ON;"
        );
        assert_eq!(
            set_identity_insert("users", false),
            "SET IDENTITY_INSERT [users] OFF;"
        );
    }
}
