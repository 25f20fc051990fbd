//! Jupyter message content types
//!
//! Only the `content` part of each message; headers, signing and the
//! socket layer belong to whatever hosts the kernel.

use serde::Serialize;
use serde_json::{Map, Value};

pub const PROTOCOL_VERSION: &str = "5.3";

/// Reply status shared by execute and complete replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// `execute_reply` content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteReply {
    pub status: Status,
    pub execution_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_expressions: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evalue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Vec<String>>,
}

impl ExecuteReply {
    pub fn ok(execution_count: u64) -> Self {
        Self {
            status: Status::Ok,
            execution_count,
            payload: Some(Vec::new()),
            user_expressions: Some(Map::new()),
            ename: None,
            evalue: None,
            traceback: None,
        }
    }

    pub fn error(execution_count: u64, error: &ErrorContent) -> Self {
        Self {
            status: Status::Error,
            execution_count,
            payload: None,
            user_expressions: None,
            ename: Some(error.ename.clone()),
            evalue: Some(error.evalue.clone()),
            traceback: Some(error.traceback.clone()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// `error` content, also embedded in an error `execute_reply`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorContent {
    pub ename: String,
    pub evalue: String,
    pub traceback: Vec<String>,
}

/// A message published on IOPub while executing a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msg_type", content = "content", rename_all = "snake_case")]
pub enum Output {
    DisplayData {
        data: Map<String, Value>,
        metadata: Map<String, Value>,
    },
    ExecuteResult {
        execution_count: u64,
        data: Map<String, Value>,
        metadata: Map<String, Value>,
    },
    Error(ErrorContent),
}

impl Output {
    /// `display_data` carrying a single MIME bundle entry
    pub fn display(mime: &str, body: impl Into<String>) -> Self {
        Self::DisplayData {
            data: mime_bundle(mime, body),
            metadata: Map::new(),
        }
    }

    pub fn execute_result(execution_count: u64, text: impl Into<String>) -> Self {
        Self::ExecuteResult {
            execution_count,
            data: mime_bundle("text/plain", text),
            metadata: Map::new(),
        }
    }

    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::DisplayData { .. } => "display_data",
            Self::ExecuteResult { .. } => "execute_result",
            Self::Error(_) => "error",
        }
    }

    /// The body stored under `mime`, if this output carries one
    pub fn data(&self, mime: &str) -> Option<&str> {
        match self {
            Self::DisplayData { data, .. } | Self::ExecuteResult { data, .. } => {
                data.get(mime).and_then(Value::as_str)
            }
            Self::Error(_) => None,
        }
    }
}

fn mime_bundle(mime: &str, body: impl Into<String>) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(mime.to_string(), Value::String(body.into()));
    data
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub mimetype: &'static str,
    pub file_extension: &'static str,
}

/// `kernel_info_reply` content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelInfoReply {
    pub status: Status,
    pub protocol_version: &'static str,
    pub implementation: &'static str,
    pub implementation_version: &'static str,
    pub language_info: LanguageInfo,
    pub banner: String,
    pub help_links: Vec<Value>,
}
