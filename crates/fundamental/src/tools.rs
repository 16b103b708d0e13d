//! `analyze_fundamentals` tool (§4.3 Fundamental).

use crate::provider::{AnalystConsensus, CompanyInfoSource};
use crate::scoring::{growth_score, overall_score, quality_score, valuation_score};
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::signal::{Signal, Verdict};
use shared_models::time::now_iso;
use std::collections::HashMap;
use std::sync::Arc;

pub struct FundamentalState {
    pub source: Arc<dyn CompanyInfoSource>,
}

impl FundamentalState {
    pub fn new(source: Arc<dyn CompanyInfoSource>) -> Self {
        Self { source }
    }
}

pub async fn analyze_fundamentals(state: Arc<FundamentalState>, symbol: &str) -> Result<Value, ToolError> {
    let Some(info) = state.source.lookup(symbol) else {
        return Ok(json!({
            "error": "unable to fetch fundamental data",
            "symbol": symbol,
            "timestamp": now_iso(),
        }));
    };

    let valuation = valuation_score(&info);
    let quality = quality_score(&info);
    let growth = growth_score(&info);
    let overall = overall_score(valuation, quality, growth);

    let (verdict, base_confidence) = match info.analyst_consensus {
        AnalystConsensus::Buy => (Verdict::Buy, 0.75),
        AnalystConsensus::Sell => (Verdict::Sell, 0.70),
        AnalystConsensus::Hold => (Verdict::Hold, 0.60),
    };
    let confidence = (base_confidence + overall) / 2.0;

    let mut indicators = HashMap::new();
    indicators.insert("market_cap".to_string(), json!(info.market_cap));
    indicators.insert("pe_ratio".to_string(), json!(info.pe_ratio));
    indicators.insert("pb_ratio".to_string(), json!(info.pb_ratio));
    indicators.insert("peg_ratio".to_string(), json!(info.peg_ratio));
    indicators.insert("profit_margin".to_string(), json!(info.profit_margin));
    indicators.insert("roe".to_string(), json!(info.roe));
    indicators.insert("revenue_growth".to_string(), json!(info.revenue_growth));
    indicators.insert("earnings_growth".to_string(), json!(info.earnings_growth));
    indicators.insert("debt_to_equity".to_string(), json!(info.debt_to_equity));
    indicators.insert("valuation_score".to_string(), json!(valuation));
    indicators.insert("quality_score".to_string(), json!(quality));
    indicators.insert("growth_score".to_string(), json!(growth));
    indicators.insert("overall_score".to_string(), json!(overall));
    indicators.insert("company_name".to_string(), json!(info.company_name));

    let signal = Signal::new(symbol, verdict, confidence, indicators, "fundamental");
    Ok(serde_json::to_value(signal).unwrap_or(Value::Null))
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<FundamentalState>) {
    registry.register(
        "analyze_fundamentals",
        "Score a symbol's valuation/quality/growth fundamentals into a BUY/HOLD/SELL signal.",
        json!({
            "type": "object",
            "properties": { "symbol": { "type": "string" } },
            "required": ["symbol"],
        }),
        move |args| {
            let state = state.clone();
            async move {
                let symbol = args
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("symbol must be a string"))?;
                analyze_fundamentals(state, symbol).await
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SyntheticCompanyInfoSource;

    #[tokio::test]
    async fn produces_a_verdict_for_known_symbol() {
        let state = Arc::new(FundamentalState::new(Arc::new(SyntheticCompanyInfoSource::new())));
        let result = analyze_fundamentals(state, "AAPL").await.unwrap();
        assert!(result.get("error").is_none());
        assert!(result["verdict"].is_string());
    }

    #[tokio::test]
    async fn rejects_empty_symbol() {
        let state = Arc::new(FundamentalState::new(Arc::new(SyntheticCompanyInfoSource::new())));
        let result = analyze_fundamentals(state, "").await.unwrap();
        assert!(result.get("error").is_some());
    }
}
