//! Trade orchestration pipeline (C7 / §4.7): `process_trade_request`.
//! Single-pass, non-retrying — any peer failure short-circuits and emits an
//! error audit event (§4.7).

use rpc_core::client::RpcClient;
use rpc_core::error::ToolError;
use serde_json::{json, Value};
use shared_models::hex_token;
use shared_models::time::now_iso;
use std::collections::HashMap;
use std::time::Duration;

pub struct TraderSupervisorState {
    pub market: RpcClient,
    pub technical: RpcClient,
    pub volatility: RpcClient,
    pub news: RpcClient,
    pub risk: RpcClient,
    pub execution: RpcClient,
    pub compliance: RpcClient,
}

impl TraderSupervisorState {
    pub fn from_env() -> Self {
        Self {
            market: RpcClient::new(shared_models::ports::market_url(), "trader-supervisor", Duration::from_secs(5)),
            technical: RpcClient::new(shared_models::ports::technical_url(), "trader-supervisor", Duration::from_secs(10)),
            volatility: RpcClient::new(shared_models::ports::volatility_url(), "trader-supervisor", Duration::from_secs(10)),
            news: RpcClient::new(shared_models::ports::news_url(), "trader-supervisor", Duration::from_secs(15)),
            risk: RpcClient::new(shared_models::ports::risk_url(), "trader-supervisor", Duration::from_secs(5)),
            execution: RpcClient::new(shared_models::ports::execution_url(), "trader-supervisor", Duration::from_secs(5)),
            compliance: RpcClient::new(shared_models::ports::compliance_url(), "trader-supervisor", Duration::from_secs(5)),
        }
    }

    async fn audit(&self, event_type: &str, action: &str, payload: HashMap<String, Value>, severity: &str) {
        let _ = self
            .compliance
            .call_tool(
                "log_event",
                json!({
                    "event_type": event_type,
                    "producer": "trader-supervisor",
                    "action": action,
                    "payload": payload,
                    "severity": severity,
                }),
            )
            .await;
    }

    async fn fail(&self, trade_id: &str, action: &str, reason: String) -> Value {
        let mut payload = HashMap::new();
        payload.insert("trade_id".to_string(), json!(trade_id));
        payload.insert("reason".to_string(), json!(reason));
        self.audit("error", action, payload, "critical").await;
        json!({ "success": false, "trade_id": trade_id, "reason": reason, "timestamp": now_iso() })
    }
}

fn vote(verdict: &str, bullish: &str, bearish: &str) -> i32 {
    if verdict == bullish {
        1
    } else if verdict == bearish {
        -1
    } else {
        0
    }
}

pub async fn process_trade_request(state: &TraderSupervisorState, symbol: &str, quantity: f64) -> Result<Value, ToolError> {
    let trade_id = format!("TRD-{}", hex_token(8));

    let mut start_payload = HashMap::new();
    start_payload.insert("trade_id".to_string(), json!(trade_id));
    start_payload.insert("symbol".to_string(), json!(symbol));
    start_payload.insert("quantity".to_string(), json!(quantity));
    state.audit("proposal", "start", start_payload, "info").await;

    let price_result = match state.market.call_tool("get_live_price", json!({ "symbol": symbol })).await {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&trade_id, "fetch_price", format!("market unreachable: {e}")).await),
    };
    let Some(price) = price_result.get("price").and_then(Value::as_f64) else {
        return Ok(state.fail(&trade_id, "fetch_price", "market returned no price".to_string()).await);
    };

    let (technical_result, volatility_result, news_result) = tokio::join!(
        state.technical.call_tool("analyze_technical", json!({ "symbol": symbol })),
        state.volatility.call_tool("analyze_volatility", json!({ "symbol": symbol })),
        state.news.call_tool("analyze_news", json!({ "symbol": symbol })),
    );
    let technical = match technical_result {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&trade_id, "fetch_signals", format!("technical unreachable: {e}")).await),
    };
    let volatility = match volatility_result {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&trade_id, "fetch_signals", format!("volatility unreachable: {e}")).await),
    };
    let news = match news_result {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&trade_id, "fetch_signals", format!("news unreachable: {e}")).await),
    };

    let technical_verdict = technical.get("verdict").and_then(Value::as_str).unwrap_or("HOLD").to_string();
    let technical_confidence = technical.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
    let news_verdict = news.get("verdict").and_then(Value::as_str).unwrap_or("UNKNOWN").to_string();
    let news_confidence = news.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
    let volatility_risk = volatility.get("volatility").and_then(Value::as_f64).unwrap_or(0.0);

    let votes = vote(&technical_verdict, "BUY", "SELL") + vote(&news_verdict, "POSITIVE", "NEGATIVE");
    let action = if votes > 0 {
        "BUY"
    } else if votes < 0 {
        "SELL"
    } else {
        "HOLD"
    };

    let aggregate_confidence = 0.4 * technical_confidence + 0.3 * news_confidence + 0.3 * (1.0 - volatility_risk);

    let mut contributing_signals = HashMap::new();
    contributing_signals.insert("technical".to_string(), technical.clone());
    contributing_signals.insert("volatility".to_string(), volatility.clone());
    contributing_signals.insert("news".to_string(), news.clone());

    if action == "HOLD" {
        return Ok(json!({
            "success": true,
            "trade_id": trade_id,
            "symbol": symbol,
            "action": "HOLD",
            "reason": "tied or neutral signal vote",
            "contributing_signals": contributing_signals,
            "timestamp": now_iso(),
        }));
    }

    let portfolio = match state.execution.call_tool("get_portfolio_state", json!({})).await {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&trade_id, "fetch_portfolio", format!("execution unreachable: {e}")).await),
    };
    let total_value = portfolio.get("total_value").and_then(Value::as_f64).unwrap_or(0.0);
    let trade_value = quantity * price;
    let position_size_fraction = if total_value > 0.0 { trade_value / total_value } else { 1.0 };

    let risk_verdict = match state
        .risk
        .call_tool(
            "validate_trade",
            json!({
                "confidence": aggregate_confidence,
                "volatility": volatility_risk,
                "position_size_fraction": position_size_fraction,
                "trade_value": trade_value,
            }),
        )
        .await
    {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&trade_id, "validate_risk", format!("risk unreachable: {e}")).await),
    };

    let mut risk_payload = HashMap::new();
    risk_payload.insert("trade_id".to_string(), json!(trade_id));
    risk_payload.insert("approved".to_string(), risk_verdict.get("approved").cloned().unwrap_or(json!(false)));
    risk_payload.insert("risk_score".to_string(), risk_verdict.get("risk_score").cloned().unwrap_or(json!(0.0)));
    state.audit("risk_decision", "validate_trade", risk_payload, "info").await;

    let approved = risk_verdict.get("approved").and_then(Value::as_bool).unwrap_or(false);
    if !approved {
        return Ok(json!({
            "success": true,
            "trade_id": trade_id,
            "symbol": symbol,
            "action": action,
            "approved": false,
            "risk_verdict": risk_verdict,
            "position_size_fraction": position_size_fraction,
            "trade_value": trade_value,
            "aggregated_confidence": aggregate_confidence,
            "contributing_signals": contributing_signals,
            "timestamp": now_iso(),
        }));
    }

    let execution_result = match state
        .execution
        .call_tool(
            "execute_trade",
            json!({
                "trade_id": trade_id,
                "symbol": symbol,
                "action": action,
                "quantity": quantity,
                "price": price,
                "approved": true,
                "risk_validation": risk_verdict,
            }),
        )
        .await
    {
        Ok(v) => v,
        Err(e) => return Ok(state.fail(&trade_id, "execute", format!("execution unreachable: {e}")).await),
    };

    let mut exec_payload = HashMap::new();
    exec_payload.insert("trade_id".to_string(), json!(trade_id));
    exec_payload.insert("success".to_string(), execution_result.get("success").cloned().unwrap_or(json!(false)));
    state.audit("execution", "execute_trade", exec_payload, "info").await;

    Ok(json!({
        "success": true,
        "trade_id": trade_id,
        "symbol": symbol,
        "action": action,
        "approved": true,
        "price": price,
        "quantity": quantity,
        "trade_value": trade_value,
        "position_size_fraction": position_size_fraction,
        "aggregated_confidence": aggregate_confidence,
        "risk_verdict": risk_verdict,
        "execution_result": execution_result,
        "contributing_signals": contributing_signals,
        "timestamp": now_iso(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tied_votes_yield_hold() {
        assert_eq!(vote("HOLD", "BUY", "SELL") + vote("NEUTRAL", "POSITIVE", "NEGATIVE"), 0);
    }

    #[test]
    fn opposing_votes_yield_hold() {
        assert_eq!(vote("BUY", "BUY", "SELL") + vote("NEGATIVE", "POSITIVE", "NEGATIVE"), 0);
    }

    #[test]
    fn aligned_votes_yield_buy() {
        assert_eq!(vote("BUY", "BUY", "SELL") + vote("POSITIVE", "POSITIVE", "NEGATIVE"), 2);
    }
}
