//! `analyze_volatility` tool (§4.3 Volatility): wraps C2's realized
//! volatility with a regime classifier over a 1-year rolling distribution
//! of the 30-day window.

use crate::regime::{annualized_volatility, classify_regime, rolling_volatilities, LOOKBACK_DAYS, WINDOW_DAYS};
use rpc_core::client::RpcClient;
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::time::now_iso;
use std::sync::Arc;
use std::time::Duration;

pub struct VolatilityState {
    pub market: RpcClient,
}

impl VolatilityState {
    pub fn new(market_url: String) -> Self {
        Self {
            market: RpcClient::new(market_url, "volatility", Duration::from_secs(5)),
        }
    }
}

pub async fn analyze_volatility(state: Arc<VolatilityState>, raw_symbol: &str) -> Result<Value, ToolError> {
    let candles_result = state
        .market
        .call_tool(
            "get_candles",
            json!({ "symbol": raw_symbol, "timeframe": "1d", "periods": LOOKBACK_DAYS + WINDOW_DAYS }),
        )
        .await;

    let candles_value = match candles_result {
        Ok(v) => v,
        Err(e) => return Ok(json!({ "error": format!("market unreachable: {e}"), "symbol": raw_symbol })),
    };

    if let Some(err) = candles_value.get("error") {
        return Ok(json!({ "error": err, "symbol": raw_symbol }));
    }

    let Some(candles) = candles_value.get("candles").and_then(Value::as_array) else {
        return Ok(json!({ "error": "malformed candle response", "symbol": raw_symbol }));
    };

    let closes: Vec<f64> = candles
        .iter()
        .filter_map(|c| c.get("close").and_then(Value::as_f64))
        .collect();

    if closes.len() <= WINDOW_DAYS {
        return Ok(json!({
            "error": "insufficient history to classify a volatility regime",
            "symbol": raw_symbol,
        }));
    }

    let recent_window = &closes[closes.len() - WINDOW_DAYS - 1..];
    let Some(current_volatility) = annualized_volatility(recent_window) else {
        return Ok(json!({
            "error": "insufficient data for volatility calculation",
            "symbol": raw_symbol,
        }));
    };

    let distribution = rolling_volatilities(&closes, WINDOW_DAYS);
    let regime = classify_regime(current_volatility, &distribution);
    let mean_distribution = if distribution.is_empty() {
        None
    } else {
        Some(distribution.iter().sum::<f64>() / distribution.len() as f64)
    };

    Ok(json!({
        "symbol": raw_symbol,
        "volatility": (current_volatility * 10_000.0).round() / 10_000.0,
        "regime": regime.as_str(),
        "distribution_mean": mean_distribution,
        "distribution_windows": distribution.len(),
        "timestamp": now_iso(),
    }))
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<VolatilityState>) {
    registry.register(
        "analyze_volatility",
        "Classify a symbol's current realized volatility against its 1-year rolling distribution.",
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
                analyze_volatility(state, symbol).await
            }
        },
    );
}
