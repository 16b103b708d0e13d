//! Tool handlers for the portfolio engine (C5 / §4.5). The engine never
//! throws across its RPC boundary: refusals and internal faults both come
//! back as `{success:false, reason}` (§7).

use crate::store::PortfolioStore;
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::time::now_iso;
use shared_models::trade::TradeAction;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ExecutionState {
    pub store: PortfolioStore,
}

impl ExecutionState {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            store: PortfolioStore::new(initial_cash),
        }
    }
}

fn parse_action(args: &Value) -> Result<TradeAction, ToolError> {
    match args.get("action").and_then(Value::as_str) {
        Some("BUY") => Ok(TradeAction::Buy),
        Some("SELL") => Ok(TradeAction::Sell),
        _ => Err(ToolError::new("action must be BUY or SELL")),
    }
}

fn risk_score_of(risk_validation: &Value) -> f64 {
    risk_validation
        .get("risk_score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

pub fn portfolio_state_json(state: &ExecutionState) -> Value {
    let snapshot = state.store.snapshot();
    json!({
        "cash": snapshot.cash,
        "positions": snapshot.positions,
        "total_value": snapshot.total_value(),
        "invested_fraction": snapshot.invested_fraction(),
        "cash_fraction": snapshot.cash_fraction(),
        "last_updated": snapshot.last_updated,
        "transaction_count": snapshot.transaction_history.len(),
    })
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<ExecutionState>) {
    let s = state.clone();
    registry.register(
        "get_portfolio_state",
        "Return a snapshot of the current portfolio state.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move { Ok(portfolio_state_json(&state)) }
        },
    );

    let s = state.clone();
    registry.register(
        "execute_trade",
        "Execute an approved BUY or SELL trade against the portfolio.",
        json!({
            "type": "object",
            "properties": {
                "trade_id": { "type": "string" },
                "symbol": { "type": "string" },
                "action": { "type": "string" },
                "quantity": { "type": "number" },
                "price": { "type": "number" },
                "approved": { "type": "boolean" },
                "risk_validation": { "type": "object" },
            },
            "required": ["trade_id", "symbol", "action", "quantity", "price", "approved"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let trade_id = args
                    .get("trade_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("trade_id must be a string"))?;
                let symbol = args
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("symbol must be a string"))?;
                let action = parse_action(&args)?;
                let quantity = args
                    .get("quantity")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ToolError::new("quantity must be a number"))?;
                let price = args
                    .get("price")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ToolError::new("price must be a number"))?;
                let approved = args.get("approved").and_then(Value::as_bool).unwrap_or(false);
                let risk_validation = args.get("risk_validation").cloned().unwrap_or(Value::Null);

                if !approved {
                    return Ok(json!({
                        "success": false,
                        "reason": "Trade not approved by risk validation",
                        "timestamp": now_iso(),
                    }));
                }

                match state
                    .store
                    .apply_trade(trade_id, symbol, action, quantity, price, risk_score_of(&risk_validation))
                {
                    Ok(record) => Ok(json!({
                        "success": true,
                        "trade_id": record.trade_id,
                        "symbol": record.symbol,
                        "action": record.action,
                        "quantity": record.quantity,
                        "price": record.price,
                        "value": record.value,
                        "timestamp": record.timestamp,
                    })),
                    Err(reason) => Ok(json!({
                        "success": false,
                        "reason": reason,
                        "timestamp": now_iso(),
                    })),
                }
            }
        },
    );

    let s = state.clone();
    registry.register(
        "apply_rebalance",
        "Apply an approved set of rebalance changes sequentially, without rollback on partial failure.",
        json!({
            "type": "object",
            "properties": {
                "rebalance_id": { "type": "string" },
                "changes": { "type": "array" },
                "approved": { "type": "boolean" },
                "risk_validation": { "type": "object" },
            },
            "required": ["rebalance_id", "changes", "approved"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let rebalance_id = args
                    .get("rebalance_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("rebalance_id must be a string"))?
                    .to_string();
                let approved = args.get("approved").and_then(Value::as_bool).unwrap_or(false);
                let risk_validation = args.get("risk_validation").cloned().unwrap_or(Value::Null);
                let changes = args
                    .get("changes")
                    .and_then(Value::as_array)
                    .ok_or_else(|| ToolError::new("changes must be an array"))?
                    .clone();

                if !approved {
                    return Ok(json!({
                        "success": false,
                        "reason": "Rebalance not approved by risk validation",
                        "outcomes": [],
                        "timestamp": now_iso(),
                    }));
                }

                let risk_score = risk_score_of(&risk_validation);
                let mut outcomes = Vec::with_capacity(changes.len());

                // §4.5 / §8 S4: iterate sequentially, no rollback on a
                // partial failure — every leg's outcome is reported.
                for (index, change) in changes.iter().enumerate() {
                    let symbol = change.get("symbol").and_then(Value::as_str).unwrap_or("UNKNOWN");
                    let action = match change.get("action").and_then(Value::as_str) {
                        Some("BUY") => TradeAction::Buy,
                        Some("SELL") => TradeAction::Sell,
                        _ => {
                            outcomes.push(json!({
                                "symbol": symbol,
                                "success": false,
                                "reason": "missing or invalid action",
                            }));
                            continue;
                        }
                    };
                    let quantity = change.get("quantity").and_then(Value::as_f64).unwrap_or(0.0);
                    let price = change.get("price").and_then(Value::as_f64).unwrap_or(0.0);
                    let leg_trade_id = format!("{rebalance_id}-{index}");

                    match state.store.apply_trade(&leg_trade_id, symbol, action, quantity, price, risk_score) {
                        Ok(record) => outcomes.push(json!({
                            "symbol": symbol,
                            "action": record.action,
                            "quantity": record.quantity,
                            "price": record.price,
                            "value": record.value,
                            "success": true,
                        })),
                        Err(reason) => outcomes.push(json!({
                            "symbol": symbol,
                            "action": change.get("action").cloned().unwrap_or(Value::Null),
                            "success": false,
                            "reason": reason,
                        })),
                    }
                }

                Ok(json!({
                    "success": true,
                    "rebalance_id": rebalance_id,
                    "outcomes": outcomes,
                    "timestamp": now_iso(),
                }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "update_position_prices",
        "Mark every held position to the supplied prices; no cash movement.",
        json!({
            "type": "object",
            "properties": { "prices": { "type": "object" } },
            "required": ["prices"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let prices_obj = args
                    .get("prices")
                    .and_then(Value::as_object)
                    .ok_or_else(|| ToolError::new("prices must be an object"))?;
                let prices: HashMap<String, f64> = prices_obj
                    .iter()
                    .filter_map(|(k, v)| v.as_f64().map(|p| (k.clone(), p)))
                    .collect();
                state.store.update_position_prices(&prices);
                Ok(portfolio_state_json(&state))
            }
        },
    );

    let s = state;
    registry.register(
        "reset_portfolio",
        "Reset the portfolio to an initial cash balance with no positions (testing/demo only).",
        json!({
            "type": "object",
            "properties": { "initial_cash": { "type": "number" } },
            "required": ["initial_cash"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let initial_cash = args
                    .get("initial_cash")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ToolError::new("initial_cash must be a number"))?;
                state.store.reset(initial_cash);
                Ok(portfolio_state_json(&state))
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (ToolRegistry, Arc<ExecutionState>) {
        let state = Arc::new(ExecutionState::new(100_000.0));
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, state.clone());
        (registry, state)
    }

    #[tokio::test]
    async fn execute_trade_refuses_when_not_approved() {
        let (registry, _state) = registry();
        let entry = registry.get("execute_trade").unwrap();
        let result = (entry.handler)(json!({
            "trade_id": "T1",
            "symbol": "SYM",
            "action": "BUY",
            "quantity": 1.0,
            "price": 100.0,
            "approved": false,
        }))
        .await
        .unwrap();
        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn reset_then_state_round_trips() {
        let (registry, _state) = registry();
        let reset = registry.get("reset_portfolio").unwrap();
        (reset.handler)(json!({ "initial_cash": 42.0 })).await.unwrap();
        let get = registry.get("get_portfolio_state").unwrap();
        let result = (get.handler)(json!({})).await.unwrap();
        assert_eq!(result["cash"], 42.0);
        assert_eq!(result["transaction_count"], 0);
    }

    #[tokio::test]
    async fn s4_partial_rebalance_failure_reports_all_legs() {
        // §8 S4: A sells OK, B buy fails (insufficient cash), C buy succeeds.
        // Seed a 100-share A position using up all starting cash, so the
        // portfolio's cash afterwards is effectively 0 before the SELL leg
        // replenishes it to 1000 (100 * 10).
        let state = Arc::new(ExecutionState::new(1_000.0));
        state.store.apply_trade("seed", "A", TradeAction::Buy, 100.0, 10.0, 0.0).unwrap();
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, state.clone());
        let entry = registry.get("apply_rebalance").unwrap();
        let result = (entry.handler)(json!({
            "rebalance_id": "R1",
            "approved": true,
            "changes": [
                { "symbol": "A", "action": "SELL", "quantity": 100.0, "price": 10.0 },
                { "symbol": "B", "action": "BUY", "quantity": 1000.0, "price": 50.0 },
                { "symbol": "C", "action": "BUY", "quantity": 5.0, "price": 200.0 },
            ],
        }))
        .await
        .unwrap();
        let outcomes = result["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0]["success"], true);
        assert_eq!(outcomes[1]["success"], false);
        assert_eq!(outcomes[2]["success"], true);
    }
}
