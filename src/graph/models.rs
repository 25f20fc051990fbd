//! Graph result data models.
//!
//! ## Entities
//! - [`Node`]: a vertex snapshot, identified by its database id
//! - [`Relation`]: a directed, typed edge snapshot, identified by its database id
//! - [`PropertyValue`]: typed property values (scalars, lists, maps)
//!
//! ## Aggregate
//! - [`GraphResult`]: deduplicated node and relation sets for one executed statement
//!
//! Identity is the database id alone: two snapshots of the same vertex taken
//! from different rows or paths compare equal even when their properties differ.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Property map keyed by property name, kept sorted for stable display.
pub type Properties = BTreeMap<String, PropertyValue>;

// ============================================================================
// Property values
// ============================================================================

/// A typed property value as found in a Cypher literal or a driver response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Integer view, used for `_id_` extraction
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::String(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Map(map) => write_properties(f, map, None),
        }
    }
}

/// Writes `{k: v, ...}`, optionally appending the synthetic `<_id>` entry.
fn write_properties(f: &mut fmt::Formatter<'_>, props: &Properties, id: Option<i64>) -> fmt::Result {
    write!(f, "{{")?;
    let mut first = true;
    for (key, value) in props {
        if !first {
            write!(f, ", ")?;
        }
        first = false;
        write!(f, "{}: {}", key, value)?;
    }
    if let Some(id) = id {
        if !first {
            write!(f, ", ")?;
        }
        write!(f, "<_id>: {}", id)?;
    }
    write!(f, "}}")
}

// ============================================================================
// Node
// ============================================================================

/// A vertex snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Database-assigned identity
    pub id: i64,
    /// All labels, in the order the database reported them
    pub labels: Vec<String>,
    /// Visible properties (never contains the reserved `_id_` key)
    pub properties: Properties,
}

impl Node {
    pub fn new(id: i64, labels: Vec<String>, properties: Properties) -> Self {
        Self {
            id,
            labels,
            properties,
        }
    }

    /// Primary label: the first of possibly many, empty for unlabeled nodes
    pub fn label(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or("")
    }

    /// Display string with the id embedded as a synthetic property
    pub fn caption(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(:{} ", self.label())?;
        write_properties(f, &self.properties, Some(self.id))?;
        write!(f, ")")
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

// ============================================================================
// Relation
// ============================================================================

/// A directed, typed edge snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Database-assigned identity
    pub id: i64,
    /// Relationship type (e.g. `HAS`)
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Visible properties (never contains the reserved `_id_` key)
    pub properties: Properties,
    /// Start node id; may be negative for virtual entities
    pub start_node: i64,
    /// End node id; may be negative for virtual entities
    pub end_node: i64,
}

impl Relation {
    pub fn new(
        id: i64,
        rel_type: impl Into<String>,
        properties: Properties,
        start_node: i64,
        end_node: i64,
    ) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            properties,
            start_node,
            end_node,
        }
    }

    pub fn caption(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[:{} ", self.rel_type)?;
        write_properties(f, &self.properties, Some(self.id))?;
        write!(f, "]")
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Relation {}

impl Hash for Relation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Relation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Relation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

// ============================================================================
// GraphResult
// ============================================================================

/// Deduplicated entities recovered from one executed statement.
///
/// Both collections are sets keyed by id. When the same id is inserted twice
/// the first snapshot wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResult {
    pub nodes: BTreeSet<Node>,
    pub relations: BTreeSet<Relation>,
}

impl GraphResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node; returns false if a node with the same id was already present
    pub fn insert_node(&mut self, node: Node) -> bool {
        self.nodes.insert(node)
    }

    /// Insert a relation; returns false if a relation with the same id was already present
    pub fn insert_relation(&mut self, relation: Relation) -> bool {
        self.relations.insert(relation)
    }

    /// Union another result into this one
    pub fn merge(&mut self, other: GraphResult) {
        for node in other.nodes {
            self.nodes.insert(node);
        }
        for relation in other.relations {
            self.relations.insert(relation);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relations.is_empty()
    }

    pub fn node(&self, id: i64) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn relation(&self, id: i64) -> Option<&Relation> {
        self.relations.iter().find(|r| r.id == id)
    }
}

impl Extend<Node> for GraphResult {
    fn extend<I: IntoIterator<Item = Node>>(&mut self, iter: I) {
        for node in iter {
            self.nodes.insert(node);
        }
    }
}

impl Extend<Relation> for GraphResult {
    fn extend<I: IntoIterator<Item = Relation>>(&mut self, iter: I) {
        for relation in iter {
            self.relations.insert(relation);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
