//! The streamable HTTP + SSE surface every service exposes at `POST /mcp`
//! (§4.1, §6). One router per process; the tool registry and session
//! registry are injected by the caller so every service wires up the same
//! plumbing around its own handlers.

use crate::envelope::{
    wrap_tool_result, JsonRpcRequest, JsonRpcResponse, CODE_INVALID_PARAMS, CODE_METHOD_NOT_FOUND,
    CODE_PARSE_ERROR, CODE_SESSION_REQUIRED,
};
use crate::registry::{validate_required, ToolRegistry};
use crate::session::SessionRegistry;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use shared_models::session::ClientInfo;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ServiceState {
    pub name: String,
    pub version: String,
    pub tools: ToolRegistry,
    pub sessions: Arc<SessionRegistry>,
}

impl ServiceState {
    pub fn new(name: impl Into<String>, version: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools,
            sessions: Arc::new(SessionRegistry::new(Duration::from_secs(600))),
        }
    }
}

pub fn build_router(state: Arc<ServiceState>) -> Router {
    let reaper = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            reaper.reap_idle();
        }
    });

    Router::new()
        .route("/mcp", post(mcp_handler))
        .with_state(state)
}

fn sse_body(envelope: &JsonRpcResponse) -> String {
    let json = serde_json::to_string(envelope).unwrap_or_else(|_| "{}".to_string());
    format!("data: {json}\n")
}

fn sse_response(envelope: JsonRpcResponse, session_header: Option<&str>) -> Response {
    let body = sse_body(&envelope);
    let mut response = (
        StatusCode::OK,
        [("content-type", "text/event-stream")],
        body,
    )
        .into_response();
    if let Some(session_id) = session_header {
        if let Ok(value) = HeaderValue::from_str(session_id) {
            response.headers_mut().insert("mcp-session-id", value);
        }
    }
    response
}

async fn mcp_handler(State(state): State<Arc<ServiceState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return sse_response(
                JsonRpcResponse::err(Value::Null, CODE_PARSE_ERROR, format!("invalid JSON-RPC request: {e}")),
                None,
            )
        }
    };

    let id = request.id.clone();

    if request.method != "initialize" {
        let header_session = headers
            .get("mcp-session-id")
            .and_then(|v| v.to_str().ok());
        let valid = header_session.map(|sid| state.sessions.touch(sid)).unwrap_or(false);
        if !valid {
            warn!(method = %request.method, "rejected request: missing or unknown mcp-session-id");
            return sse_response(
                JsonRpcResponse::err(id, CODE_SESSION_REQUIRED, "missing or unknown mcp-session-id"),
                None,
            );
        }
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(&state, id, request.params),
        "tools/list" => handle_tools_list(&state, id),
        "tools/call" => handle_tools_call(&state, id, request.params).await,
        other => sse_response(
            JsonRpcResponse::err(id, CODE_METHOD_NOT_FOUND, format!("unknown method: {other}")),
            None,
        ),
    }
}

fn handle_initialize(state: &Arc<ServiceState>, id: Value, params: Value) -> Response {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or("2024-11-05")
        .to_string();
    let client_info: ClientInfo = params
        .get("clientInfo")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(ClientInfo {
            name: "unknown".to_string(),
            version: "0".to_string(),
        });

    let session_id = state.sessions.mint(client_info, protocol_version.clone());
    info!(service = %state.name, session_id = %session_id, "session initialized");

    let result = serde_json::json!({
        "serverInfo": { "name": state.name, "version": state.version },
        "capabilities": { "tools": {} },
        "protocolVersion": protocol_version,
    });

    sse_response(JsonRpcResponse::ok(id, result), Some(&session_id))
}

fn handle_tools_list(state: &Arc<ServiceState>, id: Value) -> Response {
    let tools = state.tools.list();
    sse_response(JsonRpcResponse::ok(id, serde_json::json!({ "tools": tools })), None)
}

async fn handle_tools_call(state: &Arc<ServiceState>, id: Value, params: Value) -> Response {
    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return sse_response(
            JsonRpcResponse::err(id, CODE_INVALID_PARAMS, "missing tool name"),
            None,
        );
    };

    let Some(entry) = state.tools.get(tool_name) else {
        return sse_response(
            JsonRpcResponse::err(id, CODE_METHOD_NOT_FOUND, format!("unknown tool: {tool_name}")),
            None,
        );
    };

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Object(Default::default()));

    if let Err(detail) = validate_required(&entry.input_schema, &arguments) {
        return sse_response(
            JsonRpcResponse::err(id, CODE_INVALID_PARAMS, detail),
            None,
        );
    }

    let handler = entry.handler.clone();
    let outcome = handler(arguments).await;

    let value = match outcome {
        Ok(v) => v,
        // A handler-internal fault is a tool-level failure, never a
        // JSON-RPC error (§4.1, §7).
        Err(e) => serde_json::json!({ "error": e.0 }),
    };

    sse_response(JsonRpcResponse::ok(id, wrap_tool_result(value)), None)
}
