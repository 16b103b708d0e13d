//! Short-TTL cache per FRED series (§4.3 Macro: "Short TTL cache per
//! series"), mirroring `market::cache::QuoteCache`'s bucket strategy.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct SeriesCache {
    ttl_secs: u64,
    entries: Mutex<HashMap<(String, u64), f64>>,
}

fn current_bucket(ttl_secs: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    now / ttl_secs.max(1)
}

impl SeriesCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, series: &str) -> Option<f64> {
        let bucket = current_bucket(self.ttl_secs);
        let entries = self.entries.lock().expect("macro series cache poisoned");
        entries.get(&(series.to_string(), bucket)).copied()
    }

    pub fn put(&self, series: &str, value: f64) {
        let bucket = current_bucket(self.ttl_secs);
        let mut entries = self.entries.lock().expect("macro series cache poisoned");
        entries.retain(|(_, b), _| *b == bucket);
        entries.insert((series.to_string(), bucket), value);
    }
}
