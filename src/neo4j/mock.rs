//! In-memory mock implementation of CypherTransport for testing.
//!
//! Replies are queued up front and handed out in order; every statement
//! received is recorded. Conditionally compiled with `#[cfg(test)]`.

use super::error::TransportError;
use super::models::QueryResponse;
use super::traits::CypherTransport;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MockTransport {
    pub replies: Mutex<VecDeque<Result<QueryResponse, TransportError>>>,
    pub statements: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Create a mock that answers with the given replies, in order
    pub fn with_replies(replies: Vec<Result<QueryResponse, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            statements: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CypherTransport for MockTransport {
    async fn run(&self, statement: &str) -> Result<QueryResponse, TransportError> {
        self.statements.lock().await.push(statement.to_string());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(QueryResponse::default()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
