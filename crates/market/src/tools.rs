//! Tool handlers for the market service (§4.2).

use crate::cache::QuoteCache;
use crate::provider::QuoteSource;
use crate::symbol::normalize_symbol;
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::market::{Candle, Interval, Quote};
use shared_models::time::now_iso;
use std::sync::Arc;

pub struct MarketState {
    pub source: Arc<dyn QuoteSource>,
    pub cache: QuoteCache,
}

impl MarketState {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            cache: QuoteCache::new(60),
        }
    }
}

const MARKET_INDICES: &[(&str, &str)] = &[
    ("S&P 500", "^GSPC"),
    ("Dow Jones", "^DJI"),
    ("NASDAQ", "^IXIC"),
    ("Bitcoin", "BTC-USD"),
    ("Ethereum", "ETH-USD"),
];

fn annualized_log_return_volatility(candles: &[Candle]) -> Option<f64> {
    if candles.len() < 2 {
        return None;
    }
    let returns: Vec<f64> = candles
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    Some(variance.sqrt() * 252.0_f64.sqrt())
}

fn risk_level(volatility: f64) -> &'static str {
    if volatility < 0.15 {
        "LOW"
    } else if volatility < 0.30 {
        "MEDIUM"
    } else {
        "HIGH"
    }
}

pub async fn get_live_price(state: Arc<MarketState>, raw_symbol: &str) -> Result<Value, ToolError> {
    let provider_symbol = normalize_symbol(raw_symbol);

    if let Some(cached) = state.cache.get(&provider_symbol) {
        return Ok(serde_json::to_value(cached).unwrap_or(Value::Null));
    }

    let candles = match state.source.daily_series(&provider_symbol, 2).await {
        Ok(c) => c,
        Err(e) => {
            return Ok(json!({
                "error": e,
                "symbol": raw_symbol,
                "timestamp": now_iso(),
            }))
        }
    };

    let Some(latest) = candles.last() else {
        return Ok(json!({
            "error": format!("no data available for {raw_symbol}"),
            "symbol": raw_symbol,
            "timestamp": now_iso(),
        }));
    };
    let previous = candles.first().unwrap_or(latest);

    let quote = Quote {
        symbol: raw_symbol.to_string(),
        price: latest.close,
        timestamp: now_iso(),
        change_24h: Some(latest.close - previous.open),
        high_24h: Some(latest.high),
        low_24h: Some(latest.low),
        volume_24h: Some(latest.volume),
    };

    state.cache.put(&provider_symbol, quote.clone());
    Ok(serde_json::to_value(quote).unwrap_or(Value::Null))
}

pub async fn get_candles(
    state: Arc<MarketState>,
    raw_symbol: &str,
    timeframe: &str,
    periods: usize,
) -> Result<Value, ToolError> {
    let provider_symbol = normalize_symbol(raw_symbol);
    let Some(interval) = Interval::parse(timeframe) else {
        return Ok(json!({
            "error": format!("unknown timeframe: {timeframe}"),
            "symbol": raw_symbol,
            "timeframe": timeframe,
        }));
    };

    match state.source.daily_series(&provider_symbol, periods.max(1)).await {
        Ok(candles) => Ok(json!({
            "symbol": raw_symbol,
            "timeframe": interval.as_str(),
            "periods": candles.len(),
            "candles": candles,
        })),
        Err(e) => Ok(json!({
            "error": e,
            "symbol": raw_symbol,
            "timeframe": timeframe,
        })),
    }
}

pub async fn calculate_volatility(
    state: Arc<MarketState>,
    raw_symbol: &str,
    periods: usize,
) -> Result<Value, ToolError> {
    let provider_symbol = normalize_symbol(raw_symbol);
    let periods = periods.max(2);

    let candles = match state.source.daily_series(&provider_symbol, periods).await {
        Ok(c) => c,
        Err(e) => {
            return Ok(json!({
                "error": e,
                "symbol": raw_symbol,
            }))
        }
    };

    let Some(volatility) = annualized_log_return_volatility(&candles) else {
        return Ok(json!({
            "error": "insufficient data for volatility calculation",
            "symbol": raw_symbol,
        }));
    };

    Ok(json!({
        "symbol": raw_symbol,
        "volatility": (volatility * 10_000.0).round() / 10_000.0,
        "volatility_pct": (volatility * 10_000.0).round() / 100.0,
        "risk_level": risk_level(volatility),
        "periods_analyzed": candles.len() - 1,
        "timestamp": now_iso(),
    }))
}

pub async fn get_market_overview(state: Arc<MarketState>) -> Result<Value, ToolError> {
    let mut indices = serde_json::Map::new();
    for (name, provider_symbol) in MARKET_INDICES {
        match state.source.daily_series(provider_symbol, 2).await {
            Ok(candles) if candles.len() >= 2 => {
                let current = candles.last().unwrap().close;
                let previous = candles.first().unwrap().close;
                let change_pct = ((current / previous) - 1.0) * 100.0;
                indices.insert(
                    name.to_string(),
                    json!({
                        "price": (current * 100.0).round() / 100.0,
                        "change_pct": (change_pct * 100.0).round() / 100.0,
                        "trend": if change_pct > 0.0 { "UP" } else { "DOWN" },
                    }),
                );
            }
            _ => {
                indices.insert(name.to_string(), json!({ "error": "data unavailable" }));
            }
        }
    }

    Ok(json!({
        "timestamp": now_iso(),
        "indices": Value::Object(indices),
    }))
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<MarketState>) {
    let s = state.clone();
    registry.register(
        "get_live_price",
        "Get the current market price for a symbol.",
        json!({
            "type": "object",
            "properties": { "symbol": { "type": "string" } },
            "required": ["symbol"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let symbol = args
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("symbol must be a string"))?;
                get_live_price(state, symbol).await
            }
        },
    );

    let s = state.clone();
    registry.register(
        "get_candles",
        "Get historical OHLCV candles for a symbol.",
        json!({
            "type": "object",
            "properties": {
                "symbol": { "type": "string" },
                "timeframe": { "type": "string" },
                "periods": { "type": "integer" },
            },
            "required": ["symbol"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let symbol = args
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("symbol must be a string"))?;
                let timeframe = args.get("timeframe").and_then(Value::as_str).unwrap_or("1h");
                let periods = args.get("periods").and_then(Value::as_u64).unwrap_or(24) as usize;
                get_candles(state, symbol, timeframe, periods).await
            }
        },
    );

    let s = state.clone();
    registry.register(
        "calculate_volatility",
        "Calculate realized annualized volatility for a symbol.",
        json!({
            "type": "object",
            "properties": {
                "symbol": { "type": "string" },
                "periods": { "type": "integer" },
            },
            "required": ["symbol"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let symbol = args
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("symbol must be a string"))?;
                let periods = args.get("periods").and_then(Value::as_u64).unwrap_or(30) as usize;
                calculate_volatility(state, symbol, periods).await
            }
        },
    );

    let s = state;
    registry.register(
        "get_market_overview",
        "Get an overview of major market indices.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move { get_market_overview(state).await }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SyntheticQuoteSource;

    fn state() -> Arc<MarketState> {
        Arc::new(MarketState::new(Arc::new(SyntheticQuoteSource::new())))
    }

    #[tokio::test]
    async fn live_price_is_cached_across_calls() {
        let state = state();
        let first = get_live_price(state.clone(), "AAPL").await.unwrap();
        let second = get_live_price(state.clone(), "AAPL").await.unwrap();
        assert_eq!(first["price"], second["price"]);
    }

    #[tokio::test]
    async fn volatility_reports_a_risk_level() {
        let state = state();
        let result = calculate_volatility(state, "BTCUSDT", 60).await.unwrap();
        assert!(result.get("error").is_none());
        assert!(result["risk_level"].is_string());
    }

    #[tokio::test]
    async fn candles_round_trip_requested_symbol() {
        let state = state();
        let result = get_candles(state, "MSFT", "1d", 10).await.unwrap();
        assert_eq!(result["symbol"], "MSFT");
        assert_eq!(result["candles"].as_array().unwrap().len(), 10);
    }
}
