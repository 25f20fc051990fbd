//! Neo4j transports
//!
//! Three ways of getting a statement executed, matching how the kernel grew:
//! - [`HttpTransport`]: REST transactional endpoint, graph returned as JSON
//! - [`ShellTransport`]: `cypher-shell` subprocess, table scraped by [`crate::parser`]
//! - [`Neo4jClient`]: Bolt driver with typed node/relationship values

pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod shell;
pub mod traits;

pub use client::Neo4jClient;
pub use error::TransportError;
pub use http::HttpTransport;
pub use models::*;
pub use shell::ShellTransport;
pub use traits::CypherTransport;

#[cfg(test)]
pub(crate) mod mock;

use crate::Config;
use std::sync::Arc;

/// Build the transport selected by the configuration.
pub async fn connect(config: &Config) -> Result<Arc<dyn CypherTransport>, TransportError> {
    let transport: Arc<dyn CypherTransport> = match config.transport {
        TransportKind::Http => Arc::new(HttpTransport::new(
            &config.host,
            &config.rest_path,
            &config.user,
            &config.password,
            config.timeout(),
        )?),
        TransportKind::Shell => Arc::new(ShellTransport::new(
            &config.cypher_shell,
            &config.bolt_uri,
            &config.user,
            &config.password,
            config.timeout(),
        )),
        TransportKind::Bolt => Arc::new(
            Neo4jClient::new(
                &config.bolt_uri,
                &config.user,
                &config.password,
                config.database.as_deref(),
            )
            .await?,
        ),
    };
    tracing::debug!(transport = transport.name(), "transport ready");
    Ok(transport)
}
