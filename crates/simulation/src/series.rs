//! Deterministic synthetic daily-close generator used only by the
//! back-tester (§4.10). Mirrors `market::provider::SyntheticQuoteSource`'s
//! seeded-drift approach (§9: every service that needs a runnable demo
//! price series without outside credentials builds one the same way), but
//! is kept local rather than imported: the simulation engine never calls a
//! peer service (§4.10 lists no RPC dependency), so it cannot reuse C2's
//! series without breaking strict layering (§9).

fn seed(symbol: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in symbol.bytes() {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn daily_drift(seed: u64, day_index: usize) -> f64 {
    let mut x = seed.wrapping_add(day_index as u64 * 0x9E3779B97F4A7C15);
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    ((x % 2001) as f64 - 1000.0) / 1000.0 * 0.02
}

/// Starting close for `symbol`: deterministic, in `[10, 1000)`.
pub fn starting_close(symbol: &str) -> f64 {
    let s = seed(symbol);
    10.0 + (s % 99_000) as f64 / 100.0
}

/// `days` daily closes, oldest first, starting at `starting_close(symbol)`.
pub fn daily_closes(symbol: &str, days: usize) -> Vec<f64> {
    let s = seed(symbol);
    let mut price = starting_close(symbol);
    let mut closes = Vec::with_capacity(days);
    for i in 0..days {
        price = (price * (1.0 + daily_drift(s, i))).max(0.01);
        closes.push((price * 100.0).round() / 100.0);
    }
    closes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_symbol() {
        assert_eq!(daily_closes("AAPL", 30), daily_closes("AAPL", 30));
    }

    #[test]
    fn diverges_across_symbols() {
        assert_ne!(daily_closes("AAPL", 30), daily_closes("MSFT", 30));
    }
}
