//! TTL-bucketed cache for `get_live_price` (§4.2: "cached for a short TTL
//! (~60s) keyed by the (symbol, TTL-bucket) pair"). Only `get_live_price`
//! is cached; `get_candles`, `calculate_volatility` and
//! `get_market_overview` always recompute.

use shared_models::market::Quote;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct QuoteCache {
    ttl_secs: u64,
    entries: Mutex<HashMap<(String, u64), Quote>>,
}

fn current_bucket(ttl_secs: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    now / ttl_secs.max(1)
}

impl QuoteCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<Quote> {
        let bucket = current_bucket(self.ttl_secs);
        let entries = self.entries.lock().expect("quote cache poisoned");
        entries.get(&(symbol.to_string(), bucket)).cloned()
    }

    pub fn put(&self, symbol: &str, quote: Quote) {
        let bucket = current_bucket(self.ttl_secs);
        let mut entries = self.entries.lock().expect("quote cache poisoned");
        // Buckets from prior windows are dead weight; drop them on every
        // write so the map can't grow without bound across a long-running
        // process.
        entries.retain(|(_, b), _| *b == bucket);
        entries.insert((symbol.to_string(), bucket), quote);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            timestamp: shared_models::time::now_iso(),
            change_24h: None,
            high_24h: None,
            low_24h: None,
            volume_24h: None,
        }
    }

    #[test]
    fn caches_within_the_same_bucket() {
        let cache = QuoteCache::new(60);
        cache.put("AAPL", quote("AAPL", 100.0));
        let hit = cache.get("AAPL").expect("should hit cache");
        assert_eq!(hit.price, 100.0);
    }

    #[test]
    fn misses_for_uncached_symbol() {
        let cache = QuoteCache::new(60);
        assert!(cache.get("MSFT").is_none());
    }
}
