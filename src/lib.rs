//! Cypher Kernel
//!
//! A notebook kernel that runs Cypher against Neo4j and renders results as
//! an interactive graph:
//! - Output parser recovering nodes and relations from cypher-shell tables
//! - REST, cypher-shell and Bolt transports behind one trait
//! - vis-network HTML rendering with a per-kernel label color table
//! - Keyword completion and Jupyter message content types

pub mod completion;
pub mod graph;
pub mod kernel;
pub mod neo4j;
pub mod parser;
pub mod render;

use anyhow::Result;
use neo4j::TransportKind;
use render::ColorPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up inside the Jupyter configuration directory
pub const CONFIG_FILE_NAME: &str = "cypher_config.yml";

// ============================================================================
// YAML config struct (deserialization target)
// ============================================================================

/// `cypher_config.yml` structure. Every key is optional; missing keys take
/// their default individually.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YamlConfig {
    pub user: String,
    #[serde(rename = "pwd")]
    pub password: String,
    /// `hostname:port` of the REST endpoint
    pub host: String,
    pub rest_path: String,
    pub bolt_uri: String,
    pub database: Option<String>,
    pub transport: TransportKind,
    /// Path or name of the cypher-shell executable
    pub cypher_shell: String,
    pub timeout_secs: Option<u64>,
    pub color_policy: ColorPolicy,
}

impl Default for YamlConfig {
    fn default() -> Self {
        Self {
            user: "neo4j".into(),
            password: "neo4j".into(),
            host: "localhost:7474".into(),
            rest_path: "/db/data/transaction/commit".into(),
            bolt_uri: "neo4j://localhost:7687".into(),
            database: None,
            transport: TransportKind::default(),
            cypher_shell: "cypher-shell".into(),
            timeout_secs: None,
            color_policy: ColorPolicy::default(),
        }
    }
}

// ============================================================================
// Runtime config (what the kernel actually uses)
// ============================================================================

/// Kernel configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub user: String,
    pub password: String,
    pub host: String,
    pub rest_path: String,
    pub bolt_uri: String,
    pub database: Option<String>,
    pub transport: TransportKind,
    pub cypher_shell: String,
    pub timeout_secs: Option<u64>,
    pub color_policy: ColorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_yaml(YamlConfig::default())
    }
}

impl Config {
    /// Load configuration from the default location, then override with env vars.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, uses [`default_config_path`]. A missing or
    /// unparsable file falls back to env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = match yaml_path {
            Some(path) => Self::load_yaml(path),
            None => match default_config_path() {
                Some(path) => Self::load_yaml(&path),
                None => {
                    tracing::debug!("No home directory, using env vars / defaults");
                    YamlConfig::default()
                }
            },
        };

        // 2. Apply env var overrides
        let mut config = Self::from_yaml(yaml);
        if let Ok(user) = std::env::var("NEO4J_USER") {
            config.user = user;
        }
        if let Ok(password) = std::env::var("NEO4J_PASSWORD") {
            config.password = password;
        }
        if let Ok(host) = std::env::var("NEO4J_HOST") {
            config.host = host;
        }
        if let Ok(uri) = std::env::var("NEO4J_URI") {
            config.bolt_uri = uri;
        }
        if let Ok(kind) = std::env::var("CYPHER_KERNEL_TRANSPORT") {
            match kind.parse() {
                Ok(kind) => config.transport = kind,
                Err(e) => tracing::warn!("Ignoring CYPHER_KERNEL_TRANSPORT: {}", e),
            }
        }
        Ok(config)
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        Self {
            user: yaml.user,
            password: yaml.password,
            host: yaml.host,
            rest_path: yaml.rest_path,
            bolt_uri: yaml.bolt_uri,
            database: yaml.database,
            transport: yaml.transport,
            cypher_shell: yaml.cypher_shell,
            timeout_secs: yaml.timeout_secs,
            color_policy: yaml.color_policy,
        }
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(path: &Path) -> YamlConfig {
        match std::fs::read_to_string(path) {
            // An empty file parses as null
            Ok(contents) if contents.trim().is_empty() => YamlConfig::default(),
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `$HOME/{JUPYTER_CONFIG_DIR or .jupyter}/cypher_config.yml`
pub fn default_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let dir = std::env::var_os("JUPYTER_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".jupyter"));
    Some(home.join(dir).join(CONFIG_FILE_NAME))
}

// ============================================================================
// Tests
// ============================================================================
