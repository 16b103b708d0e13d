//! Investment review pipeline (C7 / §4.8): `process_investment_review`.
//! Single-pass, non-retrying — any peer failure short-circuits and emits an
//! error audit event, mirroring the trade pipeline (§4.7).

use rpc_core::client::RpcClient;
use rpc_core::error::ToolError;
use serde_json::{json, Value};
use shared_models::hex_token;
use shared_models::time::now_iso;
use std::collections::HashMap;
use std::time::Duration;

pub struct InvestorSupervisorState {
    pub execution: RpcClient,
    pub portfolio_analytics: RpcClient,
    pub macro_analyzer: RpcClient,
    pub fundamental: RpcClient,
    pub risk: RpcClient,
    pub compliance: RpcClient,
}

const MAX_TURNOVER_FRACTION: f64 = 0.30;

impl InvestorSupervisorState {
    pub fn from_env() -> Self {
        Self {
            execution: RpcClient::new(shared_models::ports::execution_url(), "investor-supervisor", Duration::from_secs(5)),
            portfolio_analytics: RpcClient::new(
                shared_models::ports::portfolio_analytics_url(),
                "investor-supervisor",
                Duration::from_secs(5),
            ),
            macro_analyzer: RpcClient::new(shared_models::ports::macro_url(), "investor-supervisor", Duration::from_secs(10)),
            fundamental: RpcClient::new(shared_models::ports::fundamental_url(), "investor-supervisor", Duration::from_secs(10)),
            risk: RpcClient::new(shared_models::ports::risk_url(), "investor-supervisor", Duration::from_secs(5)),
            compliance: RpcClient::new(shared_models::ports::compliance_url(), "investor-supervisor", Duration::from_secs(5)),
        }
    }

    async fn audit(&self, event_type: &str, action: &str, payload: HashMap<String, Value>, severity: &str) {
        let _ = self
            .compliance
            .call_tool(
                "log_event",
                json!({
                    "event_type": event_type,
                    "producer": "investor-supervisor",
                    "action": action,
                    "payload": payload,
                    "severity": severity,
                }),
            )
            .await;
    }

    async fn fail(&self, review_id: &str, action: &str, reason: String) -> Value {
        let mut payload = HashMap::new();
        payload.insert("review_id".to_string(), json!(review_id));
        payload.insert("reason".to_string(), json!(reason));
        self.audit("error", action, payload, "critical").await;
        json!({ "success": false, "review_id": review_id, "reason": reason, "timestamp": now_iso() })
    }
}

/// Base invested fraction by macro stance (§4.8 step 5), distributed equally
/// among currently held symbols.
fn invested_fraction_for_stance(stance: &str) -> f64 {
    match stance {
        "AGGRESSIVE" => 0.80,
        "BALANCED" => 0.70,
        "DEFENSIVE" => 0.50,
        _ => 0.70,
    }
}

fn target_allocation(stance: &str, symbols: &[String]) -> HashMap<String, f64> {
    let mut allocation = HashMap::new();
    if symbols.is_empty() {
        return allocation;
    }
    let invested_fraction = invested_fraction_for_stance(stance);
    let per_symbol = invested_fraction / symbols.len() as f64;
    for symbol in symbols {
        allocation.insert(symbol.clone(), per_symbol);
    }
    allocation
}

pub async fn process_investment_review(state: &InvestorSupervisorState, review_type: &str) -> Result<Value, ToolError> {
    let review_id = format!("REV-{}", hex_token(8));

    let mut start_payload = HashMap::new();
    start_payload.insert("review_id".to_string(), json!(review_id));
    start_payload.insert("review_type".to_string(), json!(review_type));
    state.audit("proposal", "start", start_payload, "info").await;

    let portfolio = match state.execution.call_tool("get_portfolio_state", json!({})).await {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&review_id, "fetch_portfolio", format!("execution unreachable: {e}")).await),
    };

    let health = match state
        .portfolio_analytics
        .call_tool("evaluate_portfolio", json!({ "state": portfolio }))
        .await
    {
        Ok(v) => v,
        Err(e) => {
            return Ok(state
                .fail(&review_id, "evaluate_portfolio", format!("portfolio-analytics unreachable: {e}"))
                .await)
        }
    };

    let macro_view = match state.macro_analyzer.call_tool("analyze_macro", json!({})).await {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&review_id, "analyze_macro", format!("macro unreachable: {e}")).await),
    };
    let investment_stance = macro_view.get("investment_stance").and_then(Value::as_str).unwrap_or("BALANCED").to_string();

    let symbols: Vec<String> = portfolio
        .get("positions")
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();

    let mut fundamentals = HashMap::new();
    for symbol in &symbols {
        match state.fundamental.call_tool("analyze_fundamentals", json!({ "symbol": symbol })).await {
            Ok(v) => {
                fundamentals.insert(symbol.clone(), v);
            }
            Err(e) => {
                return Ok(state
                    .fail(&review_id, "analyze_fundamentals", format!("fundamental unreachable for {symbol}: {e}"))
                    .await)
            }
        }
    }

    let target_allocation = target_allocation(&investment_stance, &symbols);

    let rebalance = match state
        .portfolio_analytics
        .call_tool(
            "calculate_rebalance_proposal",
            json!({ "state": portfolio, "target_allocation": target_allocation }),
        )
        .await
    {
        Ok(v) => v,
        Err(e) => {
            return Ok(state
                .fail(&review_id, "calculate_rebalance_proposal", format!("portfolio-analytics unreachable: {e}"))
                .await)
        }
    };

    let changes = rebalance.get("changes").and_then(Value::as_array).cloned().unwrap_or_default();
    if changes.is_empty() {
        return Ok(json!({
            "success": true,
            "review_id": review_id,
            "review_type": review_type,
            "action": "NO_REBALANCE",
            "reason": "no position deviates beyond the rebalance threshold",
            "portfolio_health": health,
            "macro_view": macro_view,
            "fundamentals": fundamentals,
            "target_allocation": target_allocation,
            "timestamp": now_iso(),
        }));
    }

    let turnover_fraction = rebalance.get("turnover_fraction").and_then(Value::as_f64).unwrap_or(0.0);
    let total_value = portfolio.get("total_value").and_then(Value::as_f64).unwrap_or(0.0);
    let change_fractions: Vec<Value> = changes
        .iter()
        .map(|c| {
            let value = c.get("value").and_then(Value::as_f64).unwrap_or(0.0);
            // §4.4: per-change fraction is value/total_value, not the resulting
            // target_weight (a different quantity).
            let fraction = if total_value > 0.0 { value.abs() / total_value } else { 0.0 };
            json!({
                "symbol": c.get("symbol").cloned().unwrap_or(Value::Null),
                "fraction": fraction,
            })
        })
        .collect();

    let risk_verdict = match state
        .risk
        .call_tool(
            "validate_rebalance",
            json!({
                "turnover_fraction": turnover_fraction,
                "max_turnover_fraction": MAX_TURNOVER_FRACTION,
                "changes": change_fractions,
            }),
        )
        .await
    {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&review_id, "validate_rebalance", format!("risk unreachable: {e}")).await),
    };

    let mut risk_payload = HashMap::new();
    risk_payload.insert("review_id".to_string(), json!(review_id));
    risk_payload.insert("approved".to_string(), risk_verdict.get("approved").cloned().unwrap_or(json!(false)));
    risk_payload.insert("risk_score".to_string(), risk_verdict.get("risk_score").cloned().unwrap_or(json!(0.0)));
    state.audit("risk_decision", "validate_rebalance", risk_payload, "info").await;

    let approved = risk_verdict.get("approved").and_then(Value::as_bool).unwrap_or(false);
    if !approved {
        return Ok(json!({
            "success": true,
            "review_id": review_id,
            "review_type": review_type,
            "action": "REBALANCE_PROPOSED",
            "approved": false,
            "rebalance": rebalance,
            "risk_verdict": risk_verdict,
            "portfolio_health": health,
            "macro_view": macro_view,
            "fundamentals": fundamentals,
            "timestamp": now_iso(),
        }));
    }

    let apply_result = match state
        .execution
        .call_tool(
            "apply_rebalance",
            json!({
                "rebalance_id": review_id,
                "changes": changes,
                "approved": true,
                "risk_validation": risk_verdict,
            }),
        )
        .await
    {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&review_id, "apply_rebalance", format!("execution unreachable: {e}")).await),
    };

    let mut exec_payload = HashMap::new();
    exec_payload.insert("review_id".to_string(), json!(review_id));
    exec_payload.insert("success".to_string(), apply_result.get("success").cloned().unwrap_or(json!(false)));
    state.audit("execution", "apply_rebalance", exec_payload, "info").await;

    Ok(json!({
        "success": true,
        "review_id": review_id,
        "review_type": review_type,
        "action": "REBALANCED",
        "approved": true,
        "rebalance": rebalance,
        "risk_verdict": risk_verdict,
        "apply_result": apply_result,
        "portfolio_health": health,
        "macro_view": macro_view,
        "fundamentals": fundamentals,
        "timestamp": now_iso(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stance_sets_invested_fraction() {
        assert_eq!(invested_fraction_for_stance("AGGRESSIVE"), 0.80);
        assert_eq!(invested_fraction_for_stance("BALANCED"), 0.70);
        assert_eq!(invested_fraction_for_stance("DEFENSIVE"), 0.50);
        assert_eq!(invested_fraction_for_stance("UNKNOWN"), 0.70);
    }

    #[test]
    fn allocation_splits_equally_among_held_symbols() {
        let symbols = vec!["A".to_string(), "B".to_string()];
        let allocation = target_allocation("AGGRESSIVE", &symbols);
        assert_eq!(allocation.len(), 2);
        assert!((allocation["A"] - 0.40).abs() < 1e-9);
        assert!((allocation["B"] - 0.40).abs() < 1e-9);
    }

    #[test]
    fn allocation_is_empty_with_no_positions() {
        let allocation = target_allocation("BALANCED", &[]);
        assert!(allocation.is_empty());
    }
}
