use crate::envelope::{
    CODE_INVALID_PARAMS, CODE_METHOD_NOT_FOUND, CODE_PARSE_ERROR, CODE_SESSION_REQUIRED,
};
use thiserror::Error;

/// Framework-level faults (§7): these promote to a JSON-RPC error response,
/// as opposed to tool-level faults which stay inside a normal `result`.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("invalid JSON-RPC request: {0}")]
    ParseError(String),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for tool {tool}: {detail}")]
    SchemaViolation { tool: String, detail: String },
    #[error("missing or unknown mcp-session-id")]
    SessionRequired,
}

impl FrameworkError {
    pub fn code(&self) -> i64 {
        match self {
            FrameworkError::ParseError(_) => CODE_PARSE_ERROR,
            FrameworkError::UnknownMethod(_) | FrameworkError::UnknownTool(_) => {
                CODE_METHOD_NOT_FOUND
            }
            FrameworkError::SchemaViolation { .. } => CODE_INVALID_PARAMS,
            FrameworkError::SessionRequired => CODE_SESSION_REQUIRED,
        }
    }
}

/// A tool-level fault never produces a JSON-RPC error — handlers either
/// succeed with a value, or this gets downgraded to `{error: message}`
/// inside a normal 2xx result per §4.1/§7.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ToolError(pub String);

impl ToolError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        ToolError(format!("transport error: {e}"))
    }
}

/// Client-side error when an outbound RPC call can't be completed at all
/// (unreachable peer, timeout, malformed response). Handlers MUST catch
/// this and surface `{error}` rather than propagate it as a panic (§4.1).
#[derive(Debug, Error)]
pub enum RpcClientError {
    #[error("transport error calling {method}: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("peer returned JSON-RPC error {code}: {message}")]
    Remote { code: i64, message: String },
    #[error("malformed SSE response from peer")]
    MalformedResponse,
}
