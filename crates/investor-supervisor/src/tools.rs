//! Tool registration for the investment review pipeline (C7 / §4.8).

use crate::pipeline::{process_investment_review, InvestorSupervisorState};
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<InvestorSupervisorState>) {
    registry.register(
        "process_investment_review",
        "Run the full investment review pipeline: portfolio health, macro stance, fundamentals, rebalance.",
        json!({
            "type": "object",
            "properties": {
                "review_type": { "type": "string" },
            },
        }),
        move |args| {
            let state = state.clone();
            async move {
                let review_type = args.get("review_type").and_then(Value::as_str).unwrap_or("periodic").to_string();
                process_investment_review(&state, &review_type).await
            }
        },
    );
}
