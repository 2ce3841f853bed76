use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

/// Parameter-marker style a statement is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// SQL Server RPC markers, `@P1`, `@P2`, ...
    AtP,
    /// Bare ODBC markers, `?`.
    Question,
}

lazy_static! {
    static ref AT_MARKER: Regex = Regex::new(r"@P(\d+)").expect("valid marker regex");
}

#[derive(Debug)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes[idx] == b'-' && bytes.get(idx + 1) == Some(&b'-')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes[idx] == b'/' && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes[idx] == b'*' && bytes.get(idx + 1) == Some(&b'/')
}

/// Prepare a statement for the requested marker style.
///
/// Statements are written with bare `?` markers. For [`MarkerStyle::AtP`] each
/// marker outside string literals, `[bracketed]` identifiers, and comments is
/// rewritten to the positional `@PN` form tiberius sends over RPC; for
/// [`MarkerStyle::Question`] the text is left alone. The returned count is the
/// number of parameters one row must supply.
///
/// A statement already written with `@PN` markers passes through untouched and
/// is counted by its highest marker index. T-SQL block comments nest.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn prepare_markers(sql: &str, style: MarkerStyle) -> (Cow<'_, str>, usize) {
    let mut out: Option<Vec<u8>> = None;
    let mut state = State::Normal;
    let mut count: usize = 0;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        // bytes consumed this iteration; 2 when an escape pair is swallowed
        let mut advance = 1;
        let mut replaced = false;
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => state = State::BlockComment(1),
                b'?' => {
                    count += 1;
                    if matches!(style, MarkerStyle::AtP) {
                        let buf = out.get_or_insert_with(|| bytes[..idx].to_vec());
                        buf.extend_from_slice(b"@P");
                        buf.extend_from_slice(count.to_string().as_bytes());
                        replaced = true;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        advance = 2; // escaped quote stays inside the literal
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        advance = 2;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                // `]]` escapes a closing bracket inside the identifier
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        advance = 2;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                } else if is_block_comment_end(bytes, idx) {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                }
            }
        }

        if !replaced && let Some(ref mut buf) = out {
            buf.extend_from_slice(&bytes[idx..idx + advance]);
        }

        idx += advance;
    }

    if count == 0 {
        count = preexisting_marker_count(sql);
    }

    let sql = match out {
        // the buffer is the original utf-8 text with ascii markers spliced in
        Some(buf) => Cow::Owned(String::from_utf8_lossy(&buf).into_owned()),
        None => Cow::Borrowed(sql),
    };
    (sql, count)
}

/// Highest `@PN` index already present in a statement.
fn preexisting_marker_count(sql: &str) -> usize {
    AT_MARKER
        .captures_iter(sql)
        .filter_map(|cap| cap[1].parse::<usize>().ok())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_question_marks_to_at_p() {
        let sql = "INSERT INTO users (id, name) VALUES (?, ?)";
        let (translated, count) = prepare_markers(sql, MarkerStyle::AtP);
        assert_eq!(translated, "INSERT INTO users (id, name) VALUES (@P1, @P2)");
        assert_eq!(count, 2);
    }

    #[test]
    fn question_style_counts_without_rewriting() {
        let sql = "UPDATE t SET a = ? WHERE b = ?";
        let (translated, count) = prepare_markers(sql, MarkerStyle::Question);
        assert!(matches!(translated, Cow::Borrowed(_)));
        assert_eq!(count, 2);
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '?', \"?\" -- ?\n/* ? */ from t where a = ?";
        let (translated, count) = prepare_markers(sql, MarkerStyle::AtP);
        assert_eq!(
            translated,
            "select '?', \"?\" -- ?\n/* ? */ from t where a = @P1"
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn skips_bracketed_identifiers() {
        let sql = "select [odd?name] from t where [x]]?] = ?";
        let (translated, count) = prepare_markers(sql, MarkerStyle::AtP);
        assert_eq!(translated, "select [odd?name] from t where [x]]?] = @P1");
        assert_eq!(count, 1);
    }

    #[test]
    fn escaped_single_quotes_stay_in_literal() {
        let sql = "update t set a = ? where b = 'it''s a ?'";
        let (translated, count) = prepare_markers(sql, MarkerStyle::AtP);
        assert_eq!(translated, "update t set a = @P1 where b = 'it''s a ?'");
        assert_eq!(count, 1);
    }

    #[test]
    fn nested_block_comments() {
        let sql = "/* outer /* inner ? */ still ? */ select ?";
        let (translated, count) = prepare_markers(sql, MarkerStyle::AtP);
        assert_eq!(translated, "/* outer /* inner ? */ still ? */ select @P1");
        assert_eq!(count, 1);
    }

    #[test]
    fn multibyte_text_survives_rewriting() {
        let sql = "select 'ü?ber' from t where a = ? and b = 'æøå'";
        let (translated, count) = prepare_markers(sql, MarkerStyle::AtP);
        assert_eq!(translated, "select 'ü?ber' from t where a = @P1 and b = 'æøå'");
        assert_eq!(count, 1);
    }

    #[test]
    fn preexisting_at_markers_pass_through() {
        let sql = "UPDATE t SET a = @P1 WHERE b = @P2";
        let (translated, count) = prepare_markers(sql, MarkerStyle::AtP);
        assert!(matches!(translated, Cow::Borrowed(_)));
        assert_eq!(count, 2);
    }

    #[test]
    fn statement_without_markers_counts_zero() {
        let (_, count) = prepare_markers("DELETE FROM t", MarkerStyle::AtP);
        assert_eq!(count, 0);
    }
}
