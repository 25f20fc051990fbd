//! Cypher Kernel - command line entry point
//!
//! Drives the kernel outside a notebook: run statements, replay captured
//! cypher-shell output through the parser, or query completion and info.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cypher_kernel::kernel::{CypherKernel, Execution, Output};
use cypher_kernel::{completion, parser, Config};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cypher-kernel")]
#[command(about = "Run Cypher against Neo4j and render the resulting graph")]
struct Cli {
    /// Path to cypher_config.yml (defaults to the Jupyter config directory)
    #[arg(long, global = true, env = "CYPHER_KERNEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a single statement
    Exec {
        statement: String,

        /// Write the HTML visualization to this file
        #[arg(long)]
        html: Option<PathBuf>,

        /// Print the reply and outputs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read `;`-terminated statements from stdin
    Repl,

    /// Parse captured cypher-shell output and print the graph as JSON
    Parse {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Print keyword completions
    Complete {
        code: String,

        /// Cursor position in characters (end of code when omitted)
        #[arg(long)]
        cursor: Option<usize>,
    },

    /// Print kernel_info_reply content
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout carries results
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cypher_kernel=debug".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file } => run_parse(file).await,
        Commands::Complete { code, cursor } => {
            let cursor = cursor.unwrap_or_else(|| code.chars().count());
            let reply = completion::complete(&code, cursor);
            for m in &reply.matches {
                println!("{}", m);
            }
            Ok(())
        }
        Commands::Exec {
            statement,
            html,
            json,
        } => {
            let mut kernel = start_kernel(cli.config.as_deref()).await?;
            run_exec(&mut kernel, &statement, html, json).await
        }
        Commands::Repl => {
            let mut kernel = start_kernel(cli.config.as_deref()).await?;
            run_repl(&mut kernel).await
        }
        Commands::Info => {
            let kernel = start_kernel(cli.config.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&kernel.kernel_info())?);
            Ok(())
        }
    }
}

async fn start_kernel(config_path: Option<&Path>) -> Result<CypherKernel> {
    let config = Config::from_yaml_and_env(config_path)?;
    CypherKernel::from_config(&config)
        .await
        .with_context(|| format!("failed to start {} transport", config.transport))
}

async fn run_exec(
    kernel: &mut CypherKernel,
    statement: &str,
    html: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let execution = kernel.execute(statement, false).await;

    if let Some(path) = html {
        if let Some(body) = execution.outputs.iter().find_map(|o| o.data("text/html")) {
            std::fs::write(&path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote visualization to {}", path.display());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&execution)?);
    } else {
        print_execution(&execution);
    }

    if !execution.reply.is_ok() {
        bail!("statement failed");
    }
    Ok(())
}

async fn run_repl(kernel: &mut CypherKernel) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut buffer = String::new();

    while let Some(line) = lines.next_line().await? {
        buffer.push_str(&line);
        buffer.push('\n');
        if line.trim_end().ends_with(';') {
            let execution = kernel.execute(&buffer, false).await;
            print_execution(&execution);
            buffer.clear();
        }
    }

    if !buffer.trim().is_empty() {
        let execution = kernel.execute(&buffer, false).await;
        print_execution(&execution);
    }
    Ok(())
}

fn print_execution(execution: &Execution) {
    for output in &execution.outputs {
        match output {
            Output::ExecuteResult { .. } => {
                if let Some(text) = output.data("text/plain") {
                    print!("{}", text);
                    if !text.ends_with('\n') {
                        println!();
                    }
                }
            }
            Output::Error(error) => eprintln!("{}: {}", error.ename, error.evalue),
            Output::DisplayData { .. } => {}
        }
    }
}

async fn run_parse(file: Option<PathBuf>) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            input
        }
    };

    match parser::parse_output_str(&input) {
        parser::ShellOutput::Error(payload) => bail!("{}", payload),
        parser::ShellOutput::Graph(graph) => {
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(())
        }
    }
}
