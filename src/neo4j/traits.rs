//! CypherTransport trait definition
//!
//! The seam between the kernel and whatever actually talks to Neo4j. Lets
//! the kernel be tested with an in-memory mock and lets the REST, shell and
//! Bolt backends be swapped by configuration.

use super::error::TransportError;
use super::models::QueryResponse;
use async_trait::async_trait;

#[async_trait]
pub trait CypherTransport: Send + Sync {
    /// Execute one statement and return its graph and text fallback
    async fn run(&self, statement: &str) -> Result<QueryResponse, TransportError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
