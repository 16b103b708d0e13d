//! Tool handlers for the simulation engine (C10 / §4.10).

use crate::series::{daily_closes, starting_close};
use crate::strategies::{position_units, run_backtest, StrategyType};
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::time::now_iso;
use std::collections::HashMap;

fn num(args: &Value, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::new(format!("{key} must be a number")))
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::new(format!("{key} must be a string")))
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        "simulate_trade",
        "Simulate a single BUY/SELL trade's sizing against a hypothetical portfolio value.",
        json!({
            "type": "object",
            "properties": {
                "symbol": { "type": "string" },
                "quantity": { "type": "number" },
                "action": { "type": "string" },
                "entry_price": { "type": "number" },
                "portfolio_value": { "type": "number" },
            },
            "required": ["symbol", "quantity", "action", "entry_price", "portfolio_value"],
        }),
        move |args| async move {
            let symbol = str_arg(&args, "symbol")?;
            let quantity = num(&args, "quantity")?;
            let action = str_arg(&args, "action")?;
            let entry_price = num(&args, "entry_price")?;
            let portfolio_value = num(&args, "portfolio_value")?;

            if quantity <= 0.0 || entry_price <= 0.0 {
                return Ok(json!({
                    "error": "quantity and entry_price must be positive",
                    "symbol": symbol,
                }));
            }

            let trade_value = quantity * entry_price;
            let position_size_fraction = if portfolio_value > 0.0 {
                trade_value / portfolio_value
            } else {
                1.0
            };

            Ok(json!({
                "symbol": symbol,
                "action": action,
                "quantity": quantity,
                "entry_price": entry_price,
                "trade_value": trade_value,
                "position_size_fraction": position_size_fraction,
                "remaining_portfolio_value": portfolio_value - trade_value,
                "timestamp": now_iso(),
            }))
        },
    );

    registry.register(
        "simulate_strategy",
        "Back-test buy_and_hold/momentum/mean_reversion over a synthetic daily series.",
        json!({
            "type": "object",
            "properties": {
                "strategy_type": { "type": "string" },
                "symbol": { "type": "string" },
                "initial_capital": { "type": "number" },
                "timeframe_days": { "type": "integer" },
            },
            "required": ["strategy_type", "symbol", "initial_capital", "timeframe_days"],
        }),
        move |args| async move {
            let symbol = str_arg(&args, "symbol")?;
            let initial_capital = num(&args, "initial_capital")?;
            let timeframe_days = args
                .get("timeframe_days")
                .and_then(Value::as_u64)
                .ok_or_else(|| ToolError::new("timeframe_days must be an integer"))?
                .max(30) as usize;
            let strategy_type_str = str_arg(&args, "strategy_type")?;
            let Some(strategy_type) = StrategyType::parse(strategy_type_str) else {
                return Ok(json!({
                    "error": format!("unknown strategy_type: {strategy_type_str}"),
                    "symbol": symbol,
                }));
            };

            let closes = daily_closes(symbol, timeframe_days);
            let result = run_backtest(strategy_type, symbol, &closes, initial_capital);
            Ok(serde_json::to_value(result).unwrap_or(Value::Null))
        },
    );

    registry.register(
        "simulate_portfolio_rebalance",
        "Project a rebalance's turnover given current positions and a target allocation, without executing it.",
        json!({
            "type": "object",
            "properties": {
                "current_positions": { "type": "object" },
                "target_allocation": { "type": "object" },
            },
            "required": ["current_positions", "target_allocation"],
        }),
        move |args| async move {
            let positions = args
                .get("current_positions")
                .and_then(Value::as_object)
                .ok_or_else(|| ToolError::new("current_positions must be an object"))?;
            let target = args
                .get("target_allocation")
                .and_then(Value::as_object)
                .ok_or_else(|| ToolError::new("target_allocation must be an object"))?;

            let mut current_value: HashMap<String, f64> = HashMap::new();
            let mut total_value = 0.0_f64;
            for (symbol, value) in positions {
                let value = value.get("value").and_then(Value::as_f64).unwrap_or(0.0);
                current_value.insert(symbol.clone(), value);
                total_value += value;
            }

            let mut symbols: Vec<&String> = current_value.keys().chain(target.keys()).collect();
            symbols.sort();
            symbols.dedup();

            let mut projected_changes = Vec::new();
            let mut total_turnover = 0.0_f64;
            for symbol in symbols {
                let current = *current_value.get(symbol).unwrap_or(&0.0);
                let target_weight = target.get(symbol).and_then(Value::as_f64).unwrap_or(0.0);
                let target_value = target_weight * total_value;
                let delta = target_value - current;
                if delta.abs() < 1e-9 {
                    continue;
                }
                total_turnover += delta.abs();
                projected_changes.push(json!({
                    "symbol": symbol,
                    "current_value": current,
                    "target_value": target_value,
                    "delta": delta,
                    "action": if delta > 0.0 { "BUY" } else { "SELL" },
                }));
            }

            Ok(json!({
                "total_value": total_value,
                "projected_changes": projected_changes,
                "total_turnover": total_turnover,
                "turnover_fraction": if total_value > 0.0 { total_turnover / total_value } else { 0.0 },
                "timestamp": now_iso(),
            }))
        },
    );

    registry.register(
        "calculate_position_size",
        "Size a position from account value, a risk fraction, and a stop-loss distance.",
        json!({
            "type": "object",
            "properties": {
                "account_value": { "type": "number" },
                "risk_fraction": { "type": "number" },
                "entry_price": { "type": "number" },
                "stop_price": { "type": "number" },
            },
            "required": ["account_value", "risk_fraction", "entry_price", "stop_price"],
        }),
        move |args| async move {
            let account_value = num(&args, "account_value")?;
            let risk_fraction = num(&args, "risk_fraction")?;
            let entry_price = num(&args, "entry_price")?;
            let stop_price = num(&args, "stop_price")?;

            let per_unit_risk = (entry_price - stop_price).abs();
            if per_unit_risk <= 0.0 {
                return Ok(json!({
                    "error": "entry_price and stop_price must differ",
                }));
            }

            let risk_budget = account_value * risk_fraction;
            let raw_units = risk_budget / per_unit_risk;
            let units = position_units(starting_close("SIM"), raw_units * entry_price, entry_price);

            Ok(json!({
                "risk_budget": risk_budget,
                "per_unit_risk": per_unit_risk,
                "units": units,
                "position_value": units * entry_price,
                "timestamp": now_iso(),
            }))
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulate_trade_computes_position_fraction() {
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry);
        let entry = registry.get("simulate_trade").unwrap();
        let result = (entry.handler)(json!({
            "symbol": "SYM",
            "quantity": 1.0,
            "action": "BUY",
            "entry_price": 100.0,
            "portfolio_value": 1000.0,
        }))
        .await
        .unwrap();
        assert_eq!(result["position_size_fraction"], 0.1);
    }

    #[tokio::test]
    async fn simulate_strategy_rejects_unknown_type() {
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry);
        let entry = registry.get("simulate_strategy").unwrap();
        let result = (entry.handler)(json!({
            "strategy_type": "bogus",
            "symbol": "SYM",
            "initial_capital": 1000.0,
            "timeframe_days": 60,
        }))
        .await
        .unwrap();
        assert!(result.get("error").is_some());
    }
}
