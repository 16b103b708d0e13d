//! The process-wide risk policy constants (§4.4). A plain struct rather
//! than free-floating constants so the validator can hand a caller-visible
//! `get_risk_policy()` snapshot without re-deriving it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub max_position_fraction: f64,
    pub max_volatility: f64,
    pub min_confidence: f64,
    pub max_single_trade_value: f64,
    pub max_portfolio_invested_fraction: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            max_position_fraction: 0.15,
            max_volatility: 0.50,
            min_confidence: 0.60,
            max_single_trade_value: 20_000.0,
            max_portfolio_invested_fraction: 0.80,
        }
    }
}
