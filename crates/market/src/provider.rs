//! Backing price source for the market service (§4.2). A live deployment
//! wires a real vendor in behind this trait; this crate ships a
//! self-contained deterministic generator so the federation is runnable
//! without outside credentials, the same way a quote client falls back to a
//! placeholder price when a live quote isn't wired in.

use async_trait::async_trait;
use shared_models::market::Candle;
use shared_models::time::{nanos_to_iso, now_nanos};

const NANOS_PER_DAY: i64 = 86_400_000_000_000;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn daily_series(&self, provider_symbol: &str, days: usize) -> Result<Vec<Candle>, String>;
}

#[derive(Default)]
pub struct SyntheticQuoteSource;

impl SyntheticQuoteSource {
    pub fn new() -> Self {
        Self
    }

    fn seed(symbol: &str) -> u64 {
        let mut hash: u64 = 0xcbf29ce484222325; // FNV-1a offset basis
        for b in symbol.bytes() {
            hash ^= b as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }

    fn base_price(seed: u64) -> f64 {
        10.0 + (seed % 90_000) as f64 / 100.0
    }

    fn daily_drift(seed: u64, day_index: usize) -> f64 {
        let mut x = seed.wrapping_add(day_index as u64 * 0x9E3779B97F4A7C15);
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        ((x % 2001) as f64 - 1000.0) / 1000.0 * 0.02
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[async_trait]
impl QuoteSource for SyntheticQuoteSource {
    async fn daily_series(&self, provider_symbol: &str, days: usize) -> Result<Vec<Candle>, String> {
        if provider_symbol.is_empty() {
            return Err("symbol must not be empty".to_string());
        }
        if days == 0 {
            return Err("periods must be positive".to_string());
        }

        let seed = Self::seed(provider_symbol);
        let mut price = Self::base_price(seed);
        let now = now_nanos();
        let mut candles = Vec::with_capacity(days);

        for i in 0..days {
            let drift = Self::daily_drift(seed, i);
            let open = price;
            price = (price * (1.0 + drift)).max(0.01);
            let close = price;
            let high = open.max(close) * 1.003;
            let low = open.min(close) * 0.997;
            let x = seed.wrapping_add(i as u64 * 0x85EBCA6B);
            let volume = 1_000_000 + (x % 5_000_000);
            let ts_nanos = now - (days - 1 - i) as i64 * NANOS_PER_DAY;
            candles.push(Candle {
                timestamp: nanos_to_iso(ts_nanos),
                open: round2(open),
                high: round2(high),
                low: round2(low),
                close: round2(close),
                volume,
            });
        }

        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_symbol_is_deterministic() {
        let source = SyntheticQuoteSource::new();
        let a = source.daily_series("AAPL", 30).await.unwrap();
        let b = source.daily_series("AAPL", 30).await.unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.close, y.close);
        }
    }

    #[tokio::test]
    async fn different_symbols_diverge() {
        let source = SyntheticQuoteSource::new();
        let a = source.daily_series("AAPL", 10).await.unwrap();
        let b = source.daily_series("MSFT", 10).await.unwrap();
        assert_ne!(a.last().unwrap().close, b.last().unwrap().close);
    }

    #[tokio::test]
    async fn rejects_empty_symbol() {
        let source = SyntheticQuoteSource::new();
        assert!(source.daily_series("", 10).await.is_err());
    }
}
