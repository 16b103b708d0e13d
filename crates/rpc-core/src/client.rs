//! Outbound RPC client used uniformly for client->server and
//! server->server calls (§4.1). Mirrors the reference `MCPClient`: a warm
//! session is established once with `initialize` and reused for every
//! subsequent `tools/call` for the life of the client.

use crate::envelope::JsonRpcErrorObject;
use crate::error::RpcClientError;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, serde::Deserialize)]
struct RawRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: Value,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
    client_name: String,
    session_id: Mutex<Option<String>>,
    next_id: AtomicI64,
}

impl RpcClient {
    pub fn new(base_url: impl Into<String>, client_name: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: base_url.into(),
            client_name: client_name.into(),
            session_id: Mutex::new(None),
            next_id: AtomicI64::new(1),
        }
    }

    fn next_message_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn parse_sse(text: &str) -> Option<RawRpcResponse> {
        text.lines()
            .find_map(|line| line.strip_prefix("data: "))
            .and_then(|json| serde_json::from_str(json).ok())
    }

    async fn call_raw(&self, method: &str, params: Value) -> Result<RawRpcResponse, RpcClientError> {
        let id = self.next_message_id();
        let mut request = self.http.post(format!("{}/mcp", self.base_url)).json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }));
        request = request
            .header("content-type", "application/json")
            .header("accept", "application/json, text/event-stream");

        if let Some(session_id) = self.session_id.lock().expect("rpc client session poisoned").clone() {
            request = request.header("mcp-session-id", session_id);
        }

        let response = request.send().await.map_err(|source| RpcClientError::Transport {
            method: method.to_string(),
            source,
        })?;

        if let Some(session_header) = response.headers().get("mcp-session-id") {
            if let Ok(sid) = session_header.to_str() {
                *self.session_id.lock().expect("rpc client session poisoned") = Some(sid.to_string());
            }
        }

        let text = response.text().await.map_err(|source| RpcClientError::Transport {
            method: method.to_string(),
            source,
        })?;

        Self::parse_sse(&text).ok_or(RpcClientError::MalformedResponse)
    }

    /// Idempotent: calling this more than once is a no-op once a session
    /// has been established.
    pub async fn ensure_initialized(&self) -> Result<(), RpcClientError> {
        if self.session_id.lock().expect("rpc client session poisoned").is_some() {
            return Ok(());
        }
        let params = serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": self.client_name, "version": "1.0" },
        });
        let response = self.call_raw("initialize", params).await?;
        if let Some(err) = response.error {
            return Err(RpcClientError::Remote {
                code: err.code,
                message: err.message,
            });
        }
        Ok(())
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, RpcClientError> {
        self.ensure_initialized().await?;
        let params = serde_json::json!({ "name": name, "arguments": arguments });
        let response = self.call_raw("tools/call", params).await?;
        if let Some(err) = response.error {
            return Err(RpcClientError::Remote {
                code: err.code,
                message: err.message,
            });
        }
        let result = response.result.ok_or(RpcClientError::MalformedResponse)?;
        if let Some(structured) = result.get("structuredContent").and_then(|sc| sc.get("result")) {
            return Ok(structured.clone());
        }
        // Fall back to parsing the text block, per §6 "clients may consume
        // either form".
        let text = result
            .get("content")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .ok_or(RpcClientError::MalformedResponse)?;
        serde_json::from_str(text).map_err(|_| RpcClientError::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sse_data_line() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"ok\":true}}\n";
        let parsed = RpcClient::parse_sse(body).expect("should parse");
        assert_eq!(parsed.result.unwrap()["ok"], true);
    }

    #[test]
    fn rejects_body_without_data_line() {
        assert!(RpcClient::parse_sse("not an sse body").is_none());
    }
}
