//! Node and relation literal grammars.
//!
//! ```text
//! (:Label1:Label2 {key: value, ..., _id_: 58})
//! [:TYPE {key: value, ..., _id_: 36}[58>60]]
//! ```

use super::literal::{self, LiteralError};
use super::split::is_balanced;
use crate::graph::{Node, Properties, Relation};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Reserved property carrying the database id in shell output
pub const ID_KEY: &str = "_id_";

static NODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\((?P<labels>(?::(?:`[^`]*`|[^\s:{}()`]+))*)\s*(?P<props>\{.*\})\s*\)$")
        .expect("node literal pattern is valid")
});

static RELATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^\[:(?P<type>`[^`]*`|[^\s{}\[\]`]+)\s*(?P<props>\{.*\})\s*\[(?P<start>-?\d+)>(?P<end>-?\d+)\]\]$",
    )
    .expect("relation literal pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("not a {0} literal")]
    Grammar(&'static str),

    #[error("unbalanced brackets")]
    Unbalanced,

    #[error("invalid property block: {0}")]
    Literal(#[from] LiteralError),

    #[error("missing or non-integer _id_")]
    MissingId,

    #[error("endpoint id out of range")]
    Endpoint,
}

/// Parse `(:Label {…, _id_: n})` into a [`Node`].
pub fn parse_node(content: &str) -> Result<Node, EntityError> {
    let content = content.trim();
    if !is_balanced(content) {
        return Err(EntityError::Unbalanced);
    }
    let caps = NODE_RE
        .captures(content)
        .ok_or(EntityError::Grammar("node"))?;
    let labels = split_labels(&caps["labels"]);
    let mut properties = literal::parse_map(&caps["props"])?;
    let id = take_id(&mut properties)?;
    Ok(Node::new(id, labels, properties))
}

/// Parse `[:TYPE {…, _id_: n}[start>end]]` into a [`Relation`].
pub fn parse_relation(content: &str) -> Result<Relation, EntityError> {
    let content = content.trim();
    if !is_balanced(content) {
        return Err(EntityError::Unbalanced);
    }
    let caps = RELATION_RE
        .captures(content)
        .ok_or(EntityError::Grammar("relation"))?;
    let rel_type = caps["type"].trim_matches('`').to_string();
    let mut properties = literal::parse_map(&caps["props"])?;
    let id = take_id(&mut properties)?;
    let start = caps["start"]
        .parse::<i64>()
        .map_err(|_| EntityError::Endpoint)?;
    let end = caps["end"]
        .parse::<i64>()
        .map_err(|_| EntityError::Endpoint)?;
    Ok(Relation::new(id, rel_type, properties, start, end))
}

fn take_id(properties: &mut Properties) -> Result<i64, EntityError> {
    properties
        .remove(ID_KEY)
        .and_then(|v| v.as_i64())
        .ok_or(EntityError::MissingId)
}

/// `:A:`B C`` -> ["A", "B C"]
fn split_labels(raw: &str) -> Vec<String> {
    let mut labels = Vec::new();
    let mut current = String::new();
    let mut in_backticks = false;
    for ch in raw.chars() {
        match ch {
            '`' => in_backticks = !in_backticks,
            ':' if !in_backticks => {
                if !current.is_empty() {
                    labels.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        labels.push(current);
    }
    labels
}
