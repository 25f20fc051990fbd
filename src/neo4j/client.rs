//! Neo4j Bolt client built on the official-protocol driver.
//!
//! Typed driver values carry node and relationship identities directly, so
//! this transport needs no output scraping.

use super::error::TransportError;
use super::models::QueryResponse;
use super::traits::CypherTransport;
use crate::graph::{GraphResult, Node, Properties, PropertyValue, Relation};
use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Client for Neo4j over Bolt
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Connect to Neo4j, optionally pinning a database name
    pub async fn new(
        uri: &str,
        user: &str,
        password: &str,
        database: Option<&str>,
    ) -> Result<Self, TransportError> {
        let graph = match database {
            Some(db) => {
                let config = ConfigBuilder::default()
                    .uri(uri)
                    .user(user)
                    .password(password)
                    .db(db)
                    .build()?;
                Graph::connect(config).await?
            }
            None => Graph::new(uri, user, password).await?,
        };
        tracing::info!("Connected to Neo4j at {}", uri);

        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    /// Execute a raw Cypher statement
    async fn execute(&self, cypher: &str) -> Result<Vec<neo4rs::Row>, TransportError> {
        let mut result = self.graph.execute(query(cypher)).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

#[async_trait]
impl CypherTransport for Neo4jClient {
    async fn run(&self, statement: &str) -> Result<QueryResponse, TransportError> {
        let rows = self.execute(statement).await?;
        let mut graph = GraphResult::new();
        let mut text = String::new();

        for row in &rows {
            let columns: Map<String, Value> = row
                .to()
                .map_err(|e| TransportError::Decode(e.to_string()))?;
            for column in columns.keys() {
                collect_column(row, column, &mut graph);
            }
            text.push_str(&Value::Object(columns).to_string());
            text.push('\n');
        }

        Ok(QueryResponse::new(graph, text))
    }

    fn name(&self) -> &'static str {
        "bolt"
    }
}

/// Read one column as whichever graph shape it holds; scalars are ignored.
fn collect_column(row: &neo4rs::Row, column: &str, graph: &mut GraphResult) {
    if let Ok(node) = row.get::<neo4rs::Node>(column) {
        graph.insert_node(convert_node(&node));
    } else if let Ok(rel) = row.get::<neo4rs::Relation>(column) {
        graph.insert_relation(convert_relation(&rel));
    } else if let Ok(path) = row.get::<neo4rs::Path>(column) {
        collect_path(&path, graph);
    } else if let Ok(nodes) = row.get::<Vec<neo4rs::Node>>(column) {
        graph.extend(nodes.iter().map(convert_node));
    } else if let Ok(rels) = row.get::<Vec<neo4rs::Relation>>(column) {
        graph.extend(rels.iter().map(convert_relation));
    } else if let Ok(paths) = row.get::<Vec<neo4rs::Path>>(column) {
        for path in &paths {
            collect_path(path, graph);
        }
    }
}

/// Walk a path's `(relation, node)` index pairs from its first node.
///
/// Relation indices are 1-based; a negative one means the relationship was
/// traversed against its direction. Node indices may repeat on cycles.
fn collect_path(path: &neo4rs::Path, graph: &mut GraphResult) {
    let nodes = path.nodes();
    let rels = path.rels();
    let Some(mut current) = nodes.first().map(neo4rs::Node::id) else {
        return;
    };

    for step in path.indices().chunks_exact(2) {
        let (rel_index, node_index) = (step[0], step[1]);
        let rel = usize::try_from(rel_index.unsigned_abs())
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| rels.get(i));
        let next = usize::try_from(node_index).ok().and_then(|i| nodes.get(i));
        let (Some(rel), Some(next)) = (rel, next) else {
            tracing::debug!(rel_index, node_index, "path index out of range");
            break;
        };

        let (start, end) = if rel_index < 0 {
            (next.id(), current)
        } else {
            (current, next.id())
        };
        graph.insert_relation(Relation::new(
            rel.id(),
            rel.typ(),
            unbounded_properties(rel),
            start,
            end,
        ));
        current = next.id();
    }
    graph.extend(nodes.iter().map(convert_node));
}

fn unbounded_properties(rel: &neo4rs::UnboundedRelation) -> Properties {
    rel.keys()
        .into_iter()
        .filter_map(|k| {
            rel.get::<Value>(k)
                .ok()
                .map(|v| (k.to_string(), PropertyValue::from(v)))
        })
        .collect()
}

fn convert_node(node: &neo4rs::Node) -> Node {
    let properties: Properties = node
        .keys()
        .into_iter()
        .filter_map(|k| {
            node.get::<Value>(k)
                .ok()
                .map(|v| (k.to_string(), PropertyValue::from(v)))
        })
        .collect();
    let labels = node.labels().into_iter().map(str::to_string).collect();
    Node::new(node.id(), labels, properties)
}

fn convert_relation(rel: &neo4rs::Relation) -> Relation {
    let properties: Properties = rel
        .keys()
        .into_iter()
        .filter_map(|k| {
            rel.get::<Value>(k)
                .ok()
                .map(|v| (k.to_string(), PropertyValue::from(v)))
        })
        .collect();
    Relation::new(
        rel.id(),
        rel.typ(),
        properties,
        rel.start_node_id(),
        rel.end_node_id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltMap, BoltNode, BoltPath, BoltType, BoltUnboundedRelation};

    fn bolt_node(id: i64, label: &str) -> BoltType {
        BoltType::Node(BoltNode::new(
            id.into(),
            vec![BoltType::String(label.into())].into(),
            BoltMap::default(),
        ))
    }

    fn bolt_rel(id: i64, typ: &str) -> BoltType {
        BoltType::UnboundedRelation(BoltUnboundedRelation::new(
            id.into(),
            typ.into(),
            BoltMap::default(),
        ))
    }

    fn path(nodes: Vec<BoltType>, rels: Vec<BoltType>, indices: &[i64]) -> neo4rs::Path {
        neo4rs::Path::new(BoltPath {
            nodes: nodes.into(),
            rels: rels.into(),
            indices: indices
                .iter()
                .map(|&i| BoltType::Integer(i.into()))
                .collect::<Vec<_>>()
                .into(),
        })
    }

    fn endpoints(graph: &GraphResult, id: i64) -> (i64, i64) {
        let rel = graph.relation(id).expect("relation in graph");
        (rel.start_node, rel.end_node)
    }

    #[test]
    fn test_collect_outgoing_path() {
        // (:Bike)-[:HAS]->(:Wheel)
        let p = path(
            vec![bolt_node(43, "Bike"), bolt_node(42, "Wheel")],
            vec![bolt_rel(22, "HAS")],
            &[1, 1],
        );
        let mut graph = GraphResult::new();
        collect_path(&p, &mut graph);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(endpoints(&graph, 22), (43, 42));
        assert_eq!(graph.relation(22).unwrap().rel_type, "HAS");
    }

    #[test]
    fn test_collect_incoming_path_keeps_direction() {
        // (:Wheel)<-[:HAS]-(:Bike)
        let p = path(
            vec![bolt_node(42, "Wheel"), bolt_node(43, "Bike")],
            vec![bolt_rel(22, "HAS")],
            &[-1, 1],
        );
        let mut graph = GraphResult::new();
        collect_path(&p, &mut graph);

        assert_eq!(endpoints(&graph, 22), (43, 42));
    }

    #[test]
    fn test_collect_cyclic_path_keeps_closing_relation() {
        // (a)-[:NEXT]->(b)-[:BACK]->(a), nodes are listed once
        let p = path(
            vec![bolt_node(1, "A"), bolt_node(2, "B")],
            vec![bolt_rel(10, "NEXT"), bolt_rel(11, "BACK")],
            &[1, 1, 2, 0],
        );
        let mut graph = GraphResult::new();
        collect_path(&p, &mut graph);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.relations.len(), 2);
        assert_eq!(endpoints(&graph, 10), (1, 2));
        assert_eq!(endpoints(&graph, 11), (2, 1));
    }

    #[test]
    fn test_collect_mixed_direction_path() {
        // (a)-[:R]->(b)<-[:S]-(c)
        let p = path(
            vec![bolt_node(1, "A"), bolt_node(2, "B"), bolt_node(3, "C")],
            vec![bolt_rel(10, "R"), bolt_rel(11, "S")],
            &[1, 1, -2, 2],
        );
        let mut graph = GraphResult::new();
        collect_path(&p, &mut graph);

        assert_eq!(endpoints(&graph, 10), (1, 2));
        assert_eq!(endpoints(&graph, 11), (3, 2));
    }

    #[test]
    fn test_collect_single_node_path() {
        let p = path(vec![bolt_node(7, "Solo")], vec![], &[]);
        let mut graph = GraphResult::new();
        collect_path(&p, &mut graph);

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.relations.is_empty());
    }
}
