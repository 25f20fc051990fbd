//! Transport-level response model

use crate::graph::GraphResult;
use serde::Serialize;

/// What a transport hands back for one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResponse {
    /// Deduplicated entities for the visualization
    pub graph: GraphResult,
    /// Plain-text rendering of the result rows
    pub text: String,
}

impl QueryResponse {
    pub fn new(graph: GraphResult, text: impl Into<String>) -> Self {
        Self {
            graph,
            text: text.into(),
        }
    }
}

/// Which backend executes statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// REST transactional endpoint
    #[default]
    Http,
    /// `cypher-shell` subprocess, output scraped by the parser
    Shell,
    /// Official Bolt driver
    Bolt,
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "rest" => Ok(Self::Http),
            "shell" | "cypher-shell" => Ok(Self::Shell),
            "bolt" | "driver" => Ok(Self::Bolt),
            other => Err(format!("unknown transport '{}'", other)),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Shell => write!(f, "shell"),
            Self::Bolt => write!(f, "bolt"),
        }
    }
}
