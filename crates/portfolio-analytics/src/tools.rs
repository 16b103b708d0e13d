//! Tool handlers for the portfolio analytics service (C6 / §4.6):
//! `evaluate_portfolio`, `calculate_rebalance_proposal`,
//! `get_allocation_summary`. All read-only, taking the portfolio state as
//! an argument rather than reaching into C5 (§9).

use crate::metrics::{
    cash_health, concentration, diversification, generate_rebalance_changes, health_rating,
    health_score, overexposed, PortfolioView,
};
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::time::now_iso;
use std::collections::HashMap;

fn parse_state(args: &Value) -> Result<PortfolioView, ToolError> {
    let state = args
        .get("state")
        .ok_or_else(|| ToolError::new("state must be provided"))?;
    serde_json::from_value(state.clone()).map_err(|e| ToolError::new(format!("malformed portfolio state: {e}")))
}

pub fn evaluate_portfolio(view: &PortfolioView) -> Value {
    let weights = view.weights();
    let conc = concentration(&weights);
    let div = diversification(&weights, conc);
    let total = view.total_value();
    let cash_fraction = if total > 0.0 { view.cash / total } else { 1.0 };
    let c_health = cash_health(cash_fraction);
    let score = health_score(div, c_health, conc);

    json!({
        "total_value": total,
        "concentration": conc,
        "diversification": div,
        "cash_fraction": cash_fraction,
        "cash_health": c_health,
        "overexposed_positions": overexposed(&weights),
        "health_score": score,
        "health_rating": health_rating(score),
        "position_count": view.positions.len(),
        "timestamp": now_iso(),
    })
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        "evaluate_portfolio",
        "Evaluate a portfolio snapshot's diversification, cash health, and overall health rating.",
        json!({
            "type": "object",
            "properties": { "state": { "type": "object" } },
            "required": ["state"],
        }),
        move |args| async move {
            let view = parse_state(&args)?;
            Ok(evaluate_portfolio(&view))
        },
    );

    registry.register(
        "calculate_rebalance_proposal",
        "Generate a rebalance proposal's changes toward a target allocation.",
        json!({
            "type": "object",
            "properties": {
                "state": { "type": "object" },
                "target_allocation": { "type": "object" },
            },
            "required": ["state", "target_allocation"],
        }),
        move |args| async move {
            let view = parse_state(&args)?;
            let target_allocation: HashMap<String, f64> = args
                .get("target_allocation")
                .and_then(Value::as_object)
                .map(|obj| obj.iter().filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f))).collect())
                .unwrap_or_default();

            let (changes, total_turnover) = generate_rebalance_changes(&view, &target_allocation);
            let total_value = view.total_value();
            let turnover_fraction = if total_value > 0.0 { total_turnover / total_value } else { 0.0 };

            Ok(json!({
                "changes": changes,
                "total_turnover": total_turnover,
                "turnover_fraction": turnover_fraction,
                "target_allocation": target_allocation,
                "rationale": format!("{} change(s) exceed the 2% rebalance threshold", changes.len()),
                "timestamp": now_iso(),
            }))
        },
    );

    registry.register(
        "get_allocation_summary",
        "Summarize current position weights against total portfolio value.",
        json!({
            "type": "object",
            "properties": { "state": { "type": "object" } },
            "required": ["state"],
        }),
        move |args| async move {
            let view = parse_state(&args)?;
            let weights = view.weights();
            Ok(json!({
                "total_value": view.total_value(),
                "cash": view.cash,
                "weights": weights,
                "overexposed_positions": overexposed(&weights),
                "timestamp": now_iso(),
            }))
        },
    );
}
