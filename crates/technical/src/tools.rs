//! `analyze_technical` tool (§4.3 Technical): SMA/RSI/MACD/Bollinger vote
//! aggregation into a BUY/SELL/HOLD `Signal`.

use crate::indicators::{bollinger_bands, ema, macd, rsi, sma};
use rpc_core::client::RpcClient;
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::signal::{Signal, Verdict};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct TechnicalState {
    pub market: RpcClient,
}

impl TechnicalState {
    pub fn new(market_url: String) -> Self {
        Self {
            market: RpcClient::new(market_url, "technical", Duration::from_secs(5)),
        }
    }
}

struct Votes {
    bullish: u32,
    bearish: u32,
}

fn count_votes(closes: &[f64]) -> Option<(Votes, HashMap<String, Value>)> {
    let price = *closes.last()?;
    let sma20 = sma(closes, 20)?;
    let sma50 = sma(closes, 50);
    let rsi14 = rsi(closes, 14)?;
    let macd_value = macd(closes);
    let bands = bollinger_bands(closes, 20, 2.0)?;

    let mut bullish = 0;
    let mut bearish = 0;

    if let Some(sma50) = sma50 {
        if price > sma20 && sma20 > sma50 {
            bullish += 2;
        }
        if price < sma20 && sma20 < sma50 {
            bearish += 2;
        }
    }

    if rsi14 < 30.0 {
        bullish += 2;
    }
    if rsi14 > 70.0 {
        bearish += 2;
    }

    if let Some(ref m) = macd_value {
        if m.histogram > 0.0 && m.macd > m.signal {
            bullish += 1;
        }
        if m.histogram < 0.0 && m.macd < m.signal {
            bearish += 1;
        }
    }

    if price < bands.lower {
        bullish += 1;
    }
    if price > bands.upper {
        bearish += 1;
    }

    let mut indicators = HashMap::new();
    indicators.insert("price".to_string(), json!(price));
    indicators.insert("sma_20".to_string(), json!(sma20));
    indicators.insert("sma_50".to_string(), json!(sma50));
    indicators.insert("sma_200".to_string(), json!(sma(closes, 200)));
    indicators.insert("rsi_14".to_string(), json!(rsi14));
    indicators.insert("ema_12".to_string(), json!(ema(closes, 12)));
    indicators.insert("ema_26".to_string(), json!(ema(closes, 26)));
    if let Some(m) = macd_value {
        indicators.insert(
            "macd".to_string(),
            json!({ "macd": m.macd, "signal": m.signal, "histogram": m.histogram }),
        );
    }
    indicators.insert(
        "bollinger_bands".to_string(),
        json!({ "upper": bands.upper, "middle": bands.middle, "lower": bands.lower }),
    );

    Some((Votes { bullish, bearish }, indicators))
}

pub async fn analyze_technical(state: Arc<TechnicalState>, raw_symbol: &str) -> Result<Value, ToolError> {
    let candles_result = state
        .market
        .call_tool(
            "get_candles",
            json!({ "symbol": raw_symbol, "timeframe": "1d", "periods": 250 }),
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

    let Some((votes, indicators)) = count_votes(&closes) else {
        return Ok(json!({
            "error": "insufficient history to compute indicators",
            "symbol": raw_symbol,
        }));
    };

    let delta = votes.bullish as i32 - votes.bearish as i32;
    let (verdict, confidence) = if votes.bullish >= 3 && votes.bullish > votes.bearish {
        (Verdict::Buy, votes.bullish as f64 / 6.0)
    } else if votes.bearish >= 3 && votes.bearish > votes.bullish {
        (Verdict::Sell, votes.bearish as f64 / 6.0)
    } else {
        (Verdict::Hold, 0.3 + 0.1 * delta.unsigned_abs() as f64)
    };

    let signal = Signal::new(raw_symbol, verdict, confidence, indicators, "technical");
    Ok(serde_json::to_value(signal).unwrap_or(Value::Null))
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<TechnicalState>) {
    registry.register(
        "analyze_technical",
        "Compute a technical BUY/SELL/HOLD signal from SMA/RSI/MACD/Bollinger votes.",
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
                analyze_technical(state, symbol).await
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tied_votes_yield_hold() {
        // Construct a flat-ish series where neither side reaches 3 votes.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 2) as f64 * 0.01).collect();
        let (votes, _) = count_votes(&closes).expect("enough history");
        let delta = votes.bullish as i32 - votes.bearish as i32;
        if votes.bullish < 3 && votes.bearish < 3 {
            assert!(delta.abs() <= 6);
        }
    }
}
