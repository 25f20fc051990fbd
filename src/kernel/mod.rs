//! Kernel request handling
//!
//! [`CypherKernel`] answers execute, complete and kernel-info requests with
//! Jupyter message content. It runs one statement at a time and never
//! retries a failed one.

pub mod messages;

pub use messages::*;

use crate::completion::{self, CompletionReply};
use crate::neo4j::{self, CypherTransport, QueryResponse};
use crate::render::{self, ColorPalette, REQUIRE_JS};
use crate::Config;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const IMPLEMENTATION: &str = "cypher_kernel";
pub const LANGUAGE: &str = "cypher";
pub const MIMETYPE: &str = "application/x-cypher-query";
pub const FILE_EXTENSION: &str = ".cql";

/// Result of one execute request
#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    pub reply: ExecuteReply,
    /// IOPub messages in publish order; empty when silent
    pub outputs: Vec<Output>,
}

/// Executes statements through a [`CypherTransport`] and keeps the label
/// colors and execution counter between requests.
///
/// ```
/// use async_trait::async_trait;
/// use cypher_kernel::kernel::CypherKernel;
/// use cypher_kernel::neo4j::{CypherTransport, QueryResponse, TransportError};
/// use cypher_kernel::render::ColorPalette;
/// use std::sync::Arc;
///
/// struct Echo;
///
/// #[async_trait]
/// impl CypherTransport for Echo {
///     async fn run(&self, statement: &str) -> Result<QueryResponse, TransportError> {
///         Ok(QueryResponse::new(Default::default(), statement))
///     }
///     fn name(&self) -> &'static str {
///         "echo"
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let mut kernel = CypherKernel::new(Arc::new(Echo), ColorPalette::default());
/// let execution = kernel.execute("RETURN 1", false).await;
/// assert!(execution.reply.is_ok());
/// assert_eq!(execution.outputs[2].data("text/plain"), Some("RETURN 1"));
/// # });
/// ```
pub struct CypherKernel {
    transport: Arc<dyn CypherTransport>,
    palette: ColorPalette,
    execution_count: u64,
}

impl CypherKernel {
    pub fn new(transport: Arc<dyn CypherTransport>, palette: ColorPalette) -> Self {
        Self {
            transport,
            palette,
            execution_count: 0,
        }
    }

    /// Connect the configured transport and build a kernel around it
    pub async fn from_config(config: &Config) -> Result<Self, neo4j::TransportError> {
        let transport = neo4j::connect(config).await?;
        Ok(Self::new(transport, ColorPalette::new(config.color_policy)))
    }

    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub async fn execute(&mut self, code: &str, silent: bool) -> Execution {
        self.execution_count += 1;
        let count = self.execution_count;

        if code.trim().is_empty() {
            return Execution {
                reply: ExecuteReply::ok(count),
                outputs: Vec::new(),
            };
        }

        match self.transport.run(code).await {
            Ok(response) => {
                tracing::debug!(
                    execution_count = count,
                    nodes = response.graph.nodes.len(),
                    relations = response.graph.relations.len(),
                    "statement executed"
                );
                let outputs = if silent {
                    Vec::new()
                } else {
                    self.outputs_for(count, &response)
                };
                Execution {
                    reply: ExecuteReply::ok(count),
                    outputs,
                }
            }
            Err(e) => {
                tracing::warn!(execution_count = count, error = %e, "statement failed");
                let evalue = e.to_string();
                let error = ErrorContent {
                    ename: e.kind().to_string(),
                    traceback: vec![evalue.clone()],
                    evalue,
                };
                let outputs = if silent {
                    Vec::new()
                } else {
                    vec![Output::Error(error.clone())]
                };
                Execution {
                    reply: ExecuteReply::error(count, &error),
                    outputs,
                }
            }
        }
    }

    fn outputs_for(&mut self, count: u64, response: &QueryResponse) -> Vec<Output> {
        let container_id = format!("cypher-graph-{}", Uuid::new_v4());
        let html = render::render_html(&response.graph, &mut self.palette, &container_id);
        let text = if response.text.trim().is_empty() {
            render::render_text(&response.graph)
        } else {
            response.text.clone()
        };

        vec![
            Output::display("application/javascript", REQUIRE_JS),
            Output::display("text/html", html),
            Output::execute_result(count, text),
        ]
    }

    pub fn complete(&self, code: &str, cursor: usize) -> CompletionReply {
        completion::complete(code, cursor)
    }

    pub fn kernel_info(&self) -> KernelInfoReply {
        KernelInfoReply {
            status: Status::Ok,
            protocol_version: PROTOCOL_VERSION,
            implementation: IMPLEMENTATION,
            implementation_version: env!("CARGO_PKG_VERSION"),
            language_info: LanguageInfo {
                name: LANGUAGE,
                version: "",
                mimetype: MIMETYPE,
                file_extension: FILE_EXTENSION,
            },
            banner: format!("Cypher kernel ({} transport)", self.transport.name()),
            help_links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphResult, Node};
    use crate::neo4j::mock::MockTransport;
    use crate::neo4j::TransportError;
    use crate::render::ColorPolicy;
    use std::collections::BTreeMap;

    fn bike_response() -> QueryResponse {
        let mut graph = GraphResult::new();
        graph.insert_node(Node::new(58, vec!["Bike".into()], BTreeMap::new()));
        QueryResponse::new(graph, "n\n(:Bike {_id_: 58})\n")
    }

    fn kernel_with(
        replies: Vec<Result<QueryResponse, TransportError>>,
    ) -> (CypherKernel, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::with_replies(replies));
        let kernel = CypherKernel::new(mock.clone(), ColorPalette::new(ColorPolicy::Deterministic));
        (kernel, mock)
    }

    #[tokio::test]
    async fn test_execute_success_outputs() {
        let (mut kernel, mock) = kernel_with(vec![Ok(bike_response())]);
        let execution = kernel.execute("MATCH (n) RETURN n", false).await;

        assert!(execution.reply.is_ok());
        assert_eq!(execution.reply.execution_count, 1);
        let kinds: Vec<_> = execution.outputs.iter().map(Output::msg_type).collect();
        assert_eq!(kinds, vec!["display_data", "display_data", "execute_result"]);
        assert_eq!(
            execution.outputs[0].data("application/javascript"),
            Some(REQUIRE_JS)
        );
        assert!(execution.outputs[1]
            .data("text/html")
            .unwrap()
            .contains(r#""label":"Bike""#));
        assert_eq!(
            execution.outputs[2].data("text/plain"),
            Some("n\n(:Bike {_id_: 58})\n")
        );
        assert_eq!(*mock.statements.lock().await, vec!["MATCH (n) RETURN n"]);
    }

    #[tokio::test]
    async fn test_execute_silent_has_no_outputs() {
        let (mut kernel, _) = kernel_with(vec![Ok(bike_response())]);
        let execution = kernel.execute("MATCH (n) RETURN n", true).await;
        assert!(execution.reply.is_ok());
        assert!(execution.outputs.is_empty());
    }

    #[tokio::test]
    async fn test_execute_blank_code_skips_transport() {
        let (mut kernel, mock) = kernel_with(vec![]);
        let execution = kernel.execute("   \n", false).await;
        assert!(execution.reply.is_ok());
        assert!(execution.outputs.is_empty());
        assert!(mock.statements.lock().await.is_empty());
        assert_eq!(kernel.execution_count(), 1);
    }

    #[tokio::test]
    async fn test_execute_error() {
        let (mut kernel, _) = kernel_with(vec![Err(TransportError::Query(
            "Invalid input 'X'".into(),
        ))]);
        let execution = kernel.execute("MATCHX (n)", false).await;

        assert_eq!(execution.reply.status, Status::Error);
        assert_eq!(execution.reply.ename.as_deref(), Some("CypherError"));
        assert_eq!(execution.reply.evalue.as_deref(), Some("Invalid input 'X'"));
        assert_eq!(execution.outputs.len(), 1);
        assert_eq!(execution.outputs[0].msg_type(), "error");
    }

    #[tokio::test]
    async fn test_counter_increments_every_request() {
        let (mut kernel, _) = kernel_with(vec![
            Ok(QueryResponse::default()),
            Err(TransportError::Connection("refused".into())),
        ]);
        assert_eq!(kernel.execute("RETURN 1", false).await.reply.execution_count, 1);
        assert_eq!(kernel.execute("RETURN 2", false).await.reply.execution_count, 2);
        assert_eq!(kernel.execute("", true).await.reply.execution_count, 3);
    }

    #[tokio::test]
    async fn test_empty_text_falls_back_to_rendered_graph() {
        let mut response = bike_response();
        response.text.clear();
        let (mut kernel, _) = kernel_with(vec![Ok(response)]);
        let execution = kernel.execute("MATCH (n) RETURN n", false).await;
        assert_eq!(
            execution.outputs[2].data("text/plain"),
            Some("(:Bike {<_id>: 58})\n")
        );
    }

    #[test]
    fn test_kernel_info() {
        let (kernel, _) = kernel_with(vec![]);
        let info = kernel.kernel_info();
        assert_eq!(info.implementation, "cypher_kernel");
        assert_eq!(info.language_info.name, "cypher");
        assert_eq!(info.language_info.mimetype, "application/x-cypher-query");
        assert_eq!(info.language_info.file_extension, ".cql");
        assert!(info.banner.contains("mock"));
    }

    #[test]
    fn test_complete_delegates() {
        let (kernel, _) = kernel_with(vec![]);
        assert_eq!(kernel.complete("MATCH (n) RET", 13).matches, vec!["RETURN"]);
    }
}
