//! Tool registration for the trade pipeline (C7 / §4.7).

use crate::pipeline::{process_trade_request, TraderSupervisorState};
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<TraderSupervisorState>) {
    registry.register(
        "process_trade_request",
        "Run the full trade pipeline for a symbol/quantity: signals, risk validation, execution.",
        json!({
            "type": "object",
            "properties": {
                "symbol": { "type": "string" },
                "quantity": { "type": "number" },
            },
            "required": ["symbol", "quantity"],
        }),
        move |args| {
            let state = state.clone();
            async move {
                let symbol = args
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("symbol must be a string"))?;
                let quantity = args
                    .get("quantity")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ToolError::new("quantity must be a number"))?;
                if quantity <= 0.0 {
                    return Ok(json!({ "success": false, "reason": "quantity must be positive" }));
                }
                process_trade_request(&state, symbol, quantity).await
            }
        },
    );
}
