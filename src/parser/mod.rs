//! cypher-shell output parser
//!
//! Recovers a [`GraphResult`] from the human-formatted table that
//! `cypher-shell --format verbose` prints for one statement. This is a
//! best-effort adapter for a display format with no formal grammar:
//! fields that do not match the expected literal shapes are skipped, and the
//! only surfaced failure is the shell's own red error output.
//!
//! Transports with a structured response (REST, Bolt) bypass this module.

pub mod entity;
pub mod field;
pub mod literal;
pub(crate) mod split;
pub mod table;

pub use field::FieldKind;
pub use table::ERROR_PREFIX;

use crate::graph::GraphResult;
use table::Content;

/// Result of parsing one statement's shell output.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellOutput {
    /// Error payload exactly as printed, ANSI codes included
    Error(String),
    /// Entities found in the data rows; empty for zero rows
    Graph(GraphResult),
}

impl ShellOutput {
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(payload) => Some(payload),
            Self::Graph(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Split into `(error, graph)`; an error always comes with an empty graph.
    pub fn into_parts(self) -> (Option<String>, GraphResult) {
        match self {
            Self::Error(payload) => (Some(payload), GraphResult::default()),
            Self::Graph(graph) => (None, graph),
        }
    }
}

/// Parse the output lines of a single executed statement.
pub fn parse_output<S: AsRef<str>>(lines: &[S]) -> ShellOutput {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim_end_matches('\r'))
        .collect();

    let rows = match table::locate(&lines) {
        Content::Error(payload) => return ShellOutput::Error(payload),
        Content::Rows(rows) => rows,
    };

    let mut graph = GraphResult::new();
    let mut skipped = 0;
    for row in &rows {
        for cell in split::split_row(table::strip_delimiters(row)) {
            skipped += field::extract(&cell, &mut graph);
        }
    }

    tracing::debug!(
        rows = rows.len(),
        nodes = graph.nodes.len(),
        relations = graph.relations.len(),
        skipped,
        "parsed shell output"
    );
    ShellOutput::Graph(graph)
}

/// Parse raw shell output text (`\n` or `\r\n` line endings).
pub fn parse_output_str(output: &str) -> ShellOutput {
    let lines: Vec<&str> = output.lines().collect();
    parse_output(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIKE_TABLE: &str = "\
+------------------------------------------------------------------------------------------------------------------+
| bike                               | p1                                                                          |
+------------------------------------------------------------------------------------------------------------------+
| (:Bike {weight: 10, _id_: 58})     | (:Bike {weight: 10, _id_: 58})-[:HAS {position: 1, _id_: 35}[58>59]]->(:Wheel {spokes: 3, _id_: 59}) |
+------------------------------------------------------------------------------------------------------------------+

1 row available after 12 ms, consumed after another 1 ms";

    #[test]
    fn test_parse_output_str_bike_table() {
        let (error, graph) = parse_output_str(BIKE_TABLE).into_parts();
        assert!(error.is_none());
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.relations.len(), 1);
        let rel = graph.relation(35).unwrap();
        assert_eq!((rel.start_node, rel.end_node), (58, 59));
    }

    #[test]
    fn test_crlf_lines() {
        let crlf = BIKE_TABLE.replace('\n', "\r\n");
        let (_, graph) = parse_output_str(&crlf).into_parts();
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_error_output() {
        let lines = vec![
            "\x1b[mRETURN x;".to_string(),
            "\x1b[31mVariable `x` not defined (line 1, column 8 (offset: 7))\x1b[m".to_string(),
        ];
        let out = parse_output(&lines);
        assert!(out.is_error());
        assert!(out.error().unwrap().contains("Variable `x` not defined"));
        let (error, graph) = out.into_parts();
        assert!(error.is_some());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_scalar_columns_are_dropped() {
        let text = "\
+-------------------+
| count | name      |
+-------------------+
| 3     | \"a-b-c\"   |
+-------------------+

1 row available after 1 ms";
        let out = parse_output_str(text);
        assert_eq!(out, ShellOutput::Graph(GraphResult::new()));
    }
}
