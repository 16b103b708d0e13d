//! `analyze_macro` tool (§4.3 Macro).

use crate::cache::SeriesCache;
use crate::indicators::{fallback_indicators, investment_stance, market_regime, risk_environment};
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::time::now_iso;
use std::sync::Arc;

pub struct MacroState {
    pub fred_api_key: Option<String>,
    #[allow(dead_code)]
    pub cache: SeriesCache,
}

impl MacroState {
    pub fn from_env() -> Self {
        Self {
            fred_api_key: std::env::var("FRED_API_KEY").ok().filter(|k| !k.is_empty()),
            cache: SeriesCache::new(3600),
        }
    }
}

pub async fn analyze_macro(state: Arc<MacroState>) -> Result<Value, ToolError> {
    // A live deployment wires FRED series fetches in behind `state.cache`
    // when `fred_api_key` is set; this federation ships without outside
    // credentials by default (§6), so it always exercises the documented
    // no-key fallback.
    let indicators = fallback_indicators();

    let regime = market_regime(&indicators);
    let (risk_env, risk_score) = risk_environment(&indicators);
    let (stance, confidence) = investment_stance(regime, risk_env);

    let mut insights = Vec::new();
    if state.fred_api_key.is_none() {
        insights.push(
            "No FRED_API_KEY configured - indicators unavailable, defaulting to neutral posture"
                .to_string(),
        );
    }

    Ok(json!({
        "market_regime": regime.as_str(),
        "risk_environment": risk_env.as_str(),
        "investment_stance": stance.as_str(),
        "risk_score": risk_score,
        "confidence": confidence,
        "indicators": indicators,
        "insights": insights,
        "timestamp": now_iso(),
    }))
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<MacroState>) {
    registry.register(
        "analyze_macro",
        "Analyze the macroeconomic environment and derive an investment stance.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = state.clone();
            async move { analyze_macro(state).await }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_to_balanced_without_fred_key() {
        let state = Arc::new(MacroState {
            fred_api_key: None,
            cache: SeriesCache::new(3600),
        });
        let result = analyze_macro(state).await.unwrap();
        assert_eq!(result["market_regime"], "UNKNOWN");
        assert_eq!(result["investment_stance"], "BALANCED");
    }
}
