//! Tool handlers for the policy validator (§4.4): `validate_trade`,
//! `validate_rebalance`, `get_risk_policy`. All pure, no I/O.

use crate::validate::{validate_rebalance, validate_trade};
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::policy::RiskPolicy;

pub struct RiskState {
    pub policy: RiskPolicy,
}

impl Default for RiskState {
    fn default() -> Self {
        Self {
            policy: RiskPolicy::default(),
        }
    }
}

fn num(args: &Value, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::new(format!("{key} must be a number")))
}

pub fn register_tools(registry: &mut ToolRegistry, state: std::sync::Arc<RiskState>) {
    let s = state.clone();
    registry.register(
        "validate_trade",
        "Validate a trade proposal against the risk policy.",
        json!({
            "type": "object",
            "properties": {
                "confidence": { "type": "number" },
                "volatility": { "type": "number" },
                "position_size_fraction": { "type": "number" },
                "trade_value": { "type": "number" },
            },
            "required": ["confidence", "volatility", "position_size_fraction", "trade_value"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let confidence = num(&args, "confidence")?;
                let volatility = num(&args, "volatility")?;
                let position_size_fraction = num(&args, "position_size_fraction")?;
                let trade_value = num(&args, "trade_value")?;
                let verdict = validate_trade(
                    &state.policy,
                    confidence,
                    volatility,
                    position_size_fraction,
                    trade_value,
                );
                Ok(serde_json::to_value(verdict).unwrap_or(Value::Null))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "validate_rebalance",
        "Validate a rebalance proposal's turnover and per-change sizing against the risk policy.",
        json!({
            "type": "object",
            "properties": {
                "turnover_fraction": { "type": "number" },
                "max_turnover_fraction": { "type": "number" },
                "changes": { "type": "array" },
            },
            "required": ["turnover_fraction", "max_turnover_fraction", "changes"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let turnover_fraction = num(&args, "turnover_fraction")?;
                let max_turnover_fraction = num(&args, "max_turnover_fraction")?;
                let changes = args
                    .get("changes")
                    .and_then(Value::as_array)
                    .ok_or_else(|| ToolError::new("changes must be an array"))?;

                let mut fractions = Vec::with_capacity(changes.len());
                for change in changes {
                    let symbol = change
                        .get("symbol")
                        .and_then(Value::as_str)
                        .unwrap_or("UNKNOWN")
                        .to_string();
                    let fraction = change
                        .get("fraction")
                        .and_then(Value::as_f64)
                        .ok_or_else(|| ToolError::new("each change needs a fraction"))?;
                    fractions.push((symbol, fraction));
                }

                let verdict = validate_rebalance(
                    &state.policy,
                    turnover_fraction,
                    max_turnover_fraction,
                    &fractions,
                );
                Ok(serde_json::to_value(verdict).unwrap_or(Value::Null))
            }
        },
    );

    let s = state;
    registry.register(
        "get_risk_policy",
        "Return the process-wide risk policy constants.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move { Ok(serde_json::to_value(state.policy).unwrap_or(Value::Null)) }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validate_trade_tool_round_trips() {
        let state = std::sync::Arc::new(RiskState::default());
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, state);
        let entry = registry.get("validate_trade").expect("tool registered");
        let result = (entry.handler)(json!({
            "confidence": 0.9,
            "volatility": 0.1,
            "position_size_fraction": 0.05,
            "trade_value": 1000.0,
        }))
        .await
        .unwrap();
        assert_eq!(result["approved"], true);
    }
}
