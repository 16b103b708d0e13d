//! Volatility math and regime classification (§4.3 Volatility): realized
//! annualized vol (same formula as `market::tools::annualized_log_return_
//! volatility`, duplicated here since each analytical service reads C2's
//! candles independently per §9's strict-layering rule — no in-process
//! imports between services) plus a regime classifier over a 1-year
//! rolling distribution of 30-day windows.

pub const WINDOW_DAYS: usize = 30;
pub const LOOKBACK_DAYS: usize = 252;

pub fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    if closes.len() < 2 {
        return None;
    }
    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    Some(variance.sqrt() * 252.0_f64.sqrt())
}

/// Realized volatility for every trailing `WINDOW_DAYS` window found in
/// `closes`, oldest window first.
pub fn rolling_volatilities(closes: &[f64], window: usize) -> Vec<f64> {
    if closes.len() <= window {
        return Vec::new();
    }
    closes
        .windows(window + 1)
        .filter_map(annualized_volatility)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityRegime {
    Low,
    Normal,
    High,
}

impl VolatilityRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityRegime::Low => "LOW",
            VolatilityRegime::Normal => "NORMAL",
            VolatilityRegime::High => "HIGH",
        }
    }
}

/// Classifies `current` against the mean of `distribution` (§4.3 Volatility:
/// ">1.5x mean -> HIGH, <0.7x mean -> LOW").
pub fn classify_regime(current: f64, distribution: &[f64]) -> VolatilityRegime {
    if distribution.is_empty() {
        return VolatilityRegime::Normal;
    }
    let mean = distribution.iter().sum::<f64>() / distribution.len() as f64;
    if mean <= 0.0 {
        return VolatilityRegime::Normal;
    }
    let ratio = current / mean;
    if ratio > 1.5 {
        VolatilityRegime::High
    } else if ratio < 0.7 {
        VolatilityRegime::Low
    } else {
        VolatilityRegime::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_volatility_spike_classifies_high() {
        let distribution = vec![0.10, 0.11, 0.09, 0.10, 0.12];
        assert_eq!(classify_regime(0.20, &distribution), VolatilityRegime::High);
    }

    #[test]
    fn quiet_period_classifies_low() {
        let distribution = vec![0.20, 0.22, 0.21, 0.19, 0.20];
        assert_eq!(classify_regime(0.10, &distribution), VolatilityRegime::Low);
    }

    #[test]
    fn middling_value_classifies_normal() {
        let distribution = vec![0.20, 0.22, 0.21, 0.19, 0.20];
        assert_eq!(classify_regime(0.21, &distribution), VolatilityRegime::Normal);
    }

    #[test]
    fn empty_distribution_defaults_normal() {
        assert_eq!(classify_regime(0.30, &[]), VolatilityRegime::Normal);
    }
}
