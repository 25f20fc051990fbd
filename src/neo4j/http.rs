//! REST transactional endpoint transport
//!
//! Posts the statement with `resultDataContents: ["row", "graph"]` so the
//! server returns node and relationship identities alongside the rows.

use super::error::TransportError;
use super::models::QueryResponse;
use super::traits::CypherTransport;
use crate::graph::{GraphResult, Node, PropertyValue, Relation};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Client for the Neo4j HTTP transactional API
pub struct HttpTransport {
    client: Client,
    url: String,
    user: String,
    password: String,
    timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    #[serde(default)]
    row: Vec<Value>,
    graph: Option<TxGraph>,
}

#[derive(Debug, Deserialize)]
struct TxGraph {
    #[serde(default)]
    nodes: Vec<TxNode>,
    #[serde(default)]
    relationships: Vec<TxRelationship>,
}

#[derive(Debug, Deserialize)]
struct TxNode {
    id: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxRelationship {
    id: String,
    #[serde(rename = "type")]
    rel_type: String,
    start_node: String,
    end_node: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

impl HttpTransport {
    /// `host` is `hostname:port`; `path` the transactional commit endpoint
    pub fn new(
        host: &str,
        path: &str,
        user: &str,
        password: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{}", host.trim_end_matches('/'), path)
        } else {
            format!("http://{}{}", host, path)
        };

        Ok(Self {
            client,
            url,
            user: user.to_string(),
            password: password.to_string(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_error(&self, e: reqwest::Error) -> TransportError {
        match self.timeout {
            Some(limit) if e.is_timeout() => TransportError::Timeout(limit),
            _ => TransportError::Connection(e.to_string()),
        }
    }
}

#[async_trait]
impl CypherTransport for HttpTransport {
    async fn run(&self, statement: &str) -> Result<QueryResponse, TransportError> {
        let payload = json!({
            "statements": [{
                "statement": statement,
                "resultDataContents": ["row", "graph"],
            }]
        });

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .header(ACCEPT, "application/json; charset=UTF-8")
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Connection(format!(
                "HTTP {} from {}",
                status, self.url
            )));
        }

        let body: TxResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(e)
            } else {
                TransportError::Decode(e.to_string())
            }
        })?;

        if let Some(err) = body.errors.first() {
            return Err(TransportError::Query(format!("{}: {}", err.code, err.message)));
        }

        Ok(convert_response(body))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn convert_response(body: TxResponse) -> QueryResponse {
    let mut graph = GraphResult::new();
    let mut text = String::new();

    for result in body.results {
        text.push_str(&result.columns.join(" | "));
        text.push('\n');
        for data in result.data {
            text.push_str(&Value::Array(data.row).to_string());
            text.push('\n');

            let Some(tx_graph) = data.graph else {
                continue;
            };
            for node in tx_graph.nodes {
                match node.id.parse::<i64>() {
                    Ok(id) => {
                        graph.insert_node(Node::new(id, node.labels, convert_properties(node.properties)));
                    }
                    Err(_) => tracing::debug!(id = %node.id, "skipping node with non-numeric id"),
                }
            }
            for rel in tx_graph.relationships {
                match (
                    rel.id.parse::<i64>(),
                    rel.start_node.parse::<i64>(),
                    rel.end_node.parse::<i64>(),
                ) {
                    (Ok(id), Ok(start), Ok(end)) => {
                        graph.insert_relation(Relation::new(
                            id,
                            rel.rel_type,
                            convert_properties(rel.properties),
                            start,
                            end,
                        ));
                    }
                    _ => tracing::debug!(id = %rel.id, "skipping relationship with non-numeric ids"),
                }
            }
        }
    }

    QueryResponse::new(graph, text)
}

fn convert_properties(properties: Map<String, Value>) -> crate::graph::Properties {
    properties
        .into_iter()
        .map(|(k, v)| (k, PropertyValue::from(v)))
        .collect()
}
