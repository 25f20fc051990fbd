//! Typed grammar for a single table cell.

use super::entity::{parse_node, parse_relation, EntityError};
use super::split::{has_path_connector, split_list, split_path};
use crate::graph::GraphResult;

/// Shape of a table cell, decided once per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `(:Label {...})`
    Node,
    /// `[:TYPE {...}[s>e]]`
    Relation,
    /// `(...)-[...]->(...)` and longer chains
    Path,
    /// `[elem, elem, ...]`
    List,
    /// Numbers, strings, `null`, maps: nothing to draw
    Scalar,
}

/// Classify a trimmed cell by its textual shape.
pub fn classify(field: &str) -> FieldKind {
    let field = field.trim();
    let mut chars = field.chars();
    let (Some(first), Some(last)) = (chars.next(), field.chars().last()) else {
        return FieldKind::Scalar;
    };
    let second = chars.next();

    if first == '[' && last == ']' && second != Some(':') {
        return FieldKind::List;
    }
    if first == '(' && has_path_connector(field) {
        return FieldKind::Path;
    }
    match (first, last, second) {
        ('(', ')', _) => FieldKind::Node,
        ('[', ']', Some(':')) => FieldKind::Relation,
        _ => FieldKind::Scalar,
    }
}

/// Parse every entity reachable from `field` into `graph`.
///
/// Elements that fail their grammar are skipped; the return value counts them.
pub fn extract(field: &str, graph: &mut GraphResult) -> usize {
    let field = field.trim();
    match classify(field) {
        FieldKind::Node => record(field, parse_node(field).map(|n| graph.insert_node(n))),
        FieldKind::Relation => {
            record(field, parse_relation(field).map(|r| graph.insert_relation(r)))
        }
        FieldKind::Path => match split_path(field) {
            Some(parts) => {
                let mut skipped = 0;
                for part in &parts {
                    skipped += extract(part, graph);
                }
                skipped
            }
            None => {
                tracing::debug!(field, "skipping malformed path");
                1
            }
        },
        FieldKind::List => {
            let (kind, elements) = split_list(&field[1..field.len() - 1]);
            tracing::trace!(?kind, elements = elements.len(), "splitting list field");
            let mut skipped = 0;
            for element in &elements {
                skipped += extract(element, graph);
            }
            skipped
        }
        FieldKind::Scalar => 0,
    }
}

fn record(field: &str, outcome: Result<bool, EntityError>) -> usize {
    match outcome {
        Ok(_) => 0,
        Err(e) => {
            tracing::debug!(field, error = %e, "skipping unparsable entity literal");
            1
        }
    }
}
