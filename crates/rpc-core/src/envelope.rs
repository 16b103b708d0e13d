//! JSON-RPC 2.0 envelope types (§4.1, §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error code reserved by this substrate for "session required".
/// Sits inside the server-error range (-32000..-32099) since the standard
/// codes below are taken by framework-level faults this substrate also
/// emits (see DESIGN.md's Open Question notes, §4.1).
pub const CODE_SESSION_REQUIRED: i64 = -32000;
pub const CODE_PARSE_ERROR: i64 = -32700;
pub const CODE_INVALID_REQUEST: i64 = -32600;
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
pub const CODE_INVALID_PARAMS: i64 = -32602;
pub const CODE_INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcErrorObject {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Wraps a tool handler's return value in the `content`/`structuredContent`
/// shape `tools/call` responses use on the wire (§4.1, §6).
pub fn wrap_tool_result(value: Value) -> Value {
    let text = serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string());
    serde_json::json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": { "result": value },
    })
}
