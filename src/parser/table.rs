//! Layout of cypher-shell's ASCII-boxed result tables.
//!
//! ```text
//! +---------------------+
//! | col1 | col2 | ...   |
//! +---------------------+
//! | val1 | val2 | ...   |
//! +---------------------+
//! N rows available after ...ms
//! ```

/// ANSI escape cypher-shell puts in front of error messages
pub const ERROR_PREFIX: &str = "\x1b[31m";

/// Where content starts in output that carries no table border
pub const LEGACY_CONTENT_OFFSET: usize = 3;

/// Content region of one statement's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content<'a> {
    /// Error payload, ANSI codes preserved
    Error(String),
    /// Data rows (header, borders and footer excluded)
    Rows(Vec<&'a str>),
}

pub fn is_border(line: &str) -> bool {
    line.trim_start().starts_with("+-")
}

pub fn is_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Locate the content region and classify it.
pub fn locate<'a>(lines: &[&'a str]) -> Content<'a> {
    let border = lines.iter().position(|l| is_border(l));
    let start = border
        .or_else(|| lines.iter().position(|l| l.starts_with(ERROR_PREFIX)))
        .unwrap_or(LEGACY_CONTENT_OFFSET.min(lines.len()));
    let content = &lines[start..];

    let first = content.iter().position(|l| !l.trim().is_empty());
    if let Some(first) = first {
        if content[first].starts_with(ERROR_PREFIX) {
            return Content::Error(error_payload(&content[first..]));
        }
    }

    let mut rows: Vec<&str> = content.iter().copied().filter(|l| is_row(l)).collect();
    if border.is_some() && !rows.is_empty() {
        // Column header
        rows.remove(0);
    }
    Content::Rows(rows)
}

fn error_payload(lines: &[&str]) -> String {
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Remove the outer box-drawing delimiters of a data row.
pub fn strip_delimiters(row: &str) -> &str {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    row.strip_suffix('|').unwrap_or(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_rows_excludes_header_and_footer() {
        let lines = [
            "MATCH (n) RETURN n, n.name;",
            "+-------------------------------+",
            "| n                    | n.name |",
            "+-------------------------------+",
            "| (:A {_id_: 1})       | \"a\"    |",
            "| (:B {_id_: 2})       | \"b\"    |",
            "+-------------------------------+",
            "",
            "2 rows available after 4 ms, consumed after another 0 ms",
        ];
        let Content::Rows(rows) = locate(&lines) else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("(:A"));
    }

    #[test]
    fn test_locate_empty_table() {
        let lines = ["+---+", "| n |", "+---+", "+---+", "", "0 rows available after 1 ms"];
        assert_eq!(locate(&lines), Content::Rows(vec![]));
    }

    #[test]
    fn test_locate_error_without_border() {
        let lines = [
            "\x1b[mMATCH (n RETURN n;",
            "\x1b[31mInvalid input 'R': expected ')'\x1b[m",
            "\x1b[31m\"MATCH (n RETURN n\"\x1b[m",
            "",
        ];
        let Content::Error(payload) = locate(&lines) else {
            panic!("expected error");
        };
        assert!(payload.starts_with(ERROR_PREFIX));
        assert_eq!(payload.lines().count(), 2);
    }

    #[test]
    fn test_locate_legacy_offset() {
        let lines = ["echo", "| n |", "", "| (:A {_id_: 1}) |", "footer"];
        assert_eq!(locate(&lines), Content::Rows(vec!["| (:A {_id_: 1}) |"]));
    }

    #[test]
    fn test_locate_short_input() {
        assert_eq!(locate(&[]), Content::Rows(vec![]));
        assert_eq!(locate(&["only one line"]), Content::Rows(vec![]));
    }

    #[test]
    fn test_strip_delimiters() {
        assert_eq!(strip_delimiters("| a | b |"), " a | b ");
        assert_eq!(strip_delimiters("  | a |  "), " a ");
    }
}
