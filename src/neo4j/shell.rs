//! `cypher-shell` subprocess transport
//!
//! Runs the statement through `cypher-shell --format verbose` and scrapes
//! the printed table with [`crate::parser`]. One subprocess per statement;
//! an optional timeout bounds the wait and kills the child when it fires.

use super::error::TransportError;
use super::models::QueryResponse;
use super::traits::CypherTransport;
use crate::parser::{self, ShellOutput};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub struct ShellTransport {
    program: PathBuf,
    address: String,
    user: String,
    password: String,
    timeout: Option<Duration>,
}

impl ShellTransport {
    pub fn new(
        program: impl Into<PathBuf>,
        address: &str,
        user: &str,
        password: &str,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            program: program.into(),
            address: address.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-a")
            .arg(&self.address)
            .arg("-u")
            .arg(&self.user)
            .arg("-p")
            .arg(&self.password)
            .arg("--format")
            .arg("verbose")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// cypher-shell only executes statements terminated by `;`
fn terminate(statement: &str) -> String {
    let trimmed = statement.trim_end();
    if trimmed.ends_with(';') {
        format!("{}\n", trimmed)
    } else {
        format!("{};\n", trimmed)
    }
}

#[async_trait]
impl CypherTransport for ShellTransport {
    async fn run(&self, statement: &str) -> Result<QueryResponse, TransportError> {
        let mut child = self.command().spawn().map_err(|e| {
            TransportError::Connection(format!(
                "failed to start {}: {}",
                self.program.display(),
                e
            ))
        })?;

        // Dropping the child on timeout kills it
        let input = terminate(statement);
        let exchange = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            child.wait_with_output().await
        };
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| TransportError::Timeout(limit))??,
            None => exchange.await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            return Err(TransportError::Query(message.to_string()));
        }

        match parser::parse_output_str(&stdout) {
            ShellOutput::Error(payload) => Err(TransportError::Query(payload)),
            ShellOutput::Graph(graph) => Ok(QueryResponse::new(graph, stdout)),
        }
    }

    fn name(&self) -> &'static str {
        "shell"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Stand-in for cypher-shell: `/bin/sh -a <script> -u ... --format verbose`
    /// runs the script, the remaining flags become positional arguments.
    fn fake_shell(dir: &tempfile::TempDir, script: &str, timeout: Option<Duration>) -> ShellTransport {
        let path = dir.path().join("cypher-shell.sh");
        std::fs::write(&path, script).unwrap();
        ShellTransport::new("/bin/sh", path.to_str().unwrap(), "neo4j", "pwd", timeout)
    }

    #[test]
    fn test_terminate() {
        assert_eq!(terminate("RETURN 1"), "RETURN 1;\n");
        assert_eq!(terminate("RETURN 1;  \n"), "RETURN 1;\n");
    }

    #[tokio::test]
    async fn test_run_parses_table() {
        let dir = tempfile::tempdir().unwrap();
        let transport = fake_shell(
            &dir,
            r#"cat > /dev/null
cat <<'TABLE'
+--------------------------------+
| n                              |
+--------------------------------+
| (:Bike {weight: 10, _id_: 58}) |
| (:Wheel {spokes: 3, _id_: 59}) |
+--------------------------------+

2 rows available after 3 ms, consumed after another 0 ms
TABLE
"#,
            None,
        );

        let response = transport.run("MATCH (n) RETURN n").await.unwrap();
        assert_eq!(response.graph.nodes.len(), 2);
        assert!(response.text.contains("2 rows available"));
    }

    #[tokio::test]
    async fn test_run_reports_failure_exit() {
        let dir = tempfile::tempdir().unwrap();
        let transport = fake_shell(
            &dir,
            "cat > /dev/null\necho 'The client is unauthorized' >&2\nexit 1\n",
            None,
        );

        let err = transport.run("RETURN 1").await.unwrap_err();
        assert!(matches!(err, TransportError::Query(ref m) if m == "The client is unauthorized"));
    }

    #[tokio::test]
    async fn test_run_reports_red_error_output() {
        let dir = tempfile::tempdir().unwrap();
        let transport = fake_shell(
            &dir,
            "cat > /dev/null\nprintf '\\033[31mVariable `x` not defined\\033[m\\n'\n",
            None,
        );

        let err = transport.run("RETURN x").await.unwrap_err();
        assert!(
            matches!(err, TransportError::Query(ref m) if m.starts_with(crate::parser::ERROR_PREFIX))
        );
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let transport = fake_shell(&dir, "sleep 5\n", Some(Duration::from_millis(100)));

        let err = transport.run("RETURN 1").await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_timeout_covers_unread_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let transport = fake_shell(&dir, "sleep 5\n", Some(Duration::from_millis(200)));

        // Larger than a pipe buffer, so the write blocks until the child reads
        let statement = format!("RETURN '{}'", "x".repeat(1 << 20));
        let started = std::time::Instant::now();
        let err = transport.run(&statement).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let transport = ShellTransport::new(
            "/nonexistent/cypher-shell-12345",
            "neo4j://localhost:7687",
            "neo4j",
            "pwd",
            None,
        );
        let err = transport.run("RETURN 1").await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
