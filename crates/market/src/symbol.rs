//! Deterministic symbol normalization (§4.2). Symbol mapping lives here and
//! nowhere else in the federation; every other service forwards whatever
//! raw symbol it was given.

const CRYPTO_TABLE: &[(&str, &str)] = &[
    ("BTC", "BTC-USD"),
    ("ETH", "ETH-USD"),
    ("SOL", "SOL-USD"),
    ("BNB", "BNB-USD"),
    ("XRP", "XRP-USD"),
    ("DOGE", "DOGE-USD"),
    ("ADA", "ADA-USD"),
];

fn lookup(base: &str) -> Option<&'static str> {
    CRYPTO_TABLE
        .iter()
        .find(|(k, _)| *k == base)
        .map(|(_, v)| *v)
}

/// Applies the four normalization rules in order (§4.2):
/// 1. exact crypto-table match,
/// 2. `USDT`-suffixed crypto pairs (strip suffix, map if known, else treat
///    the stripped base as a stock ticker),
/// 3. pass through symbols already in `-USD` form,
/// 4. pass through everything else unchanged.
pub fn normalize_symbol(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();

    if let Some(mapped) = lookup(&upper) {
        return mapped.to_string();
    }

    if let Some(base) = upper.strip_suffix("USDT") {
        return match lookup(base) {
            Some(mapped) => mapped.to_string(),
            None => base.to_string(),
        };
    }

    if upper.ends_with("-USD") {
        return upper;
    }

    upper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_crypto_match() {
        assert_eq!(normalize_symbol("BTC"), "BTC-USD");
        assert_eq!(normalize_symbol("eth"), "ETH-USD");
    }

    #[test]
    fn usdt_suffix_maps_known_base() {
        assert_eq!(normalize_symbol("BTCUSDT"), "BTC-USD");
    }

    #[test]
    fn usdt_suffix_with_unknown_base_strips_to_stock_ticker() {
        assert_eq!(normalize_symbol("AAPLUSDT"), "AAPL");
    }

    #[test]
    fn already_dash_usd_passes_through() {
        assert_eq!(normalize_symbol("LTC-USD"), "LTC-USD");
    }

    #[test]
    fn plain_stock_ticker_passes_through() {
        assert_eq!(normalize_symbol("aapl"), "AAPL");
    }
}
