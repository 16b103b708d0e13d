//! Signals produced by the stateless analytical services (C3).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// BUY/SELL/HOLD for the technical analyzer, POSITIVE/NEUTRAL/NEGATIVE for
/// sentiment-oriented producers. Kept as a single enum with an `UNKNOWN`
/// variant so the news analyzer can distinguish "no data" from "neutral"
/// per spec (§4.3 News).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Sell,
    Hold,
    Positive,
    Neutral,
    Negative,
    Unknown,
}

impl Verdict {
    pub fn is_bullish(&self) -> bool {
        matches!(self, Verdict::Buy | Verdict::Positive)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, Verdict::Sell | Verdict::Negative)
    }
}

/// Immutable output of an analytical service for a single symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub indicators: HashMap<String, Value>,
    pub timestamp: String,
    pub source: String,
}

impl Signal {
    pub fn new(
        symbol: impl Into<String>,
        verdict: Verdict,
        confidence: f64,
        indicators: HashMap<String, Value>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            verdict,
            confidence: confidence.clamp(0.0, 1.0),
            indicators,
            timestamp: crate::time::now_iso(),
            source: source.into(),
        }
    }
}
