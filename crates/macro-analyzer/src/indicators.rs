//! Macro indicator model and regime derivation (§4.3 Macro), grounded on
//! a `get_real_macro_indicators`/`analyze_macro` pairing which this
//! implementation follows when `FRED_API_KEY` is absent: §6
//! requires services to never abort startup on missing optional
//! configuration, so the "no key" branch is the one this core actually
//! exercises without outside credentials.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MacroIndicators {
    pub gdp_growth: Option<f64>,
    pub cpi_yoy: Option<f64>,
    pub unemployment_rate: Option<f64>,
    pub policy_rate: Option<f64>,
    pub treasury_2y: Option<f64>,
    pub treasury_10y: Option<f64>,
    pub vix: Option<f64>,
    pub consumer_sentiment: Option<f64>,
    pub risk_appetite: f64,
    pub liquidity_score: f64,
    pub source: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketRegime {
    Bull,
    Bear,
    Consolidation,
    Unknown,
}

impl MarketRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::Bull => "BULL",
            MarketRegime::Bear => "BEAR",
            MarketRegime::Consolidation => "CONSOLIDATION",
            MarketRegime::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskEnvironment {
    Favorable,
    Neutral,
    Challenging,
}

impl RiskEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskEnvironment::Favorable => "FAVORABLE",
            RiskEnvironment::Neutral => "NEUTRAL",
            RiskEnvironment::Challenging => "CHALLENGING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvestmentStance {
    Aggressive,
    Balanced,
    Defensive,
}

impl InvestmentStance {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStance::Aggressive => "AGGRESSIVE",
            InvestmentStance::Balanced => "BALANCED",
            InvestmentStance::Defensive => "DEFENSIVE",
        }
    }
}

/// The "no FRED_API_KEY configured" fallback (source `get_macro_data`):
/// everything unknown, risk_appetite/liquidity_score held at neutral 0.5.
pub fn fallback_indicators() -> MacroIndicators {
    MacroIndicators {
        gdp_growth: None,
        cpi_yoy: None,
        unemployment_rate: None,
        policy_rate: None,
        treasury_2y: None,
        treasury_10y: None,
        vix: None,
        consumer_sentiment: None,
        risk_appetite: 0.5,
        liquidity_score: 0.5,
        source: "unavailable",
    }
}

/// Market regime from GDP growth + CPI YoY (source `analyze_macro`):
/// BULL when GDP>2.5% and CPI<3.5%, BEAR when GDP<0, CONSOLIDATION when
/// GDP>0 otherwise, UNKNOWN when either series is missing.
pub fn market_regime(indicators: &MacroIndicators) -> MarketRegime {
    match (indicators.gdp_growth, indicators.cpi_yoy) {
        (Some(gdp), cpi) => {
            if gdp > 2.5 && cpi.map(|c| c < 3.5).unwrap_or(true) {
                MarketRegime::Bull
            } else if gdp < 0.0 {
                MarketRegime::Bear
            } else if gdp > 0.0 {
                MarketRegime::Consolidation
            } else {
                MarketRegime::Unknown
            }
        }
        _ => MarketRegime::Unknown,
    }
}

/// Risk environment from risk appetite + liquidity (source `analyze_macro`).
pub fn risk_environment(indicators: &MacroIndicators) -> (RiskEnvironment, f64) {
    if indicators.risk_appetite > 0.7 && indicators.liquidity_score > 0.7 {
        (RiskEnvironment::Favorable, 0.3)
    } else if indicators.risk_appetite < 0.5 || indicators.liquidity_score < 0.5 {
        (RiskEnvironment::Challenging, 0.7)
    } else {
        (RiskEnvironment::Neutral, 0.5)
    }
}

/// Investment stance from regime + risk environment (source `analyze_macro`).
pub fn investment_stance(regime: MarketRegime, risk_env: RiskEnvironment) -> (InvestmentStance, f64) {
    if regime == MarketRegime::Bull && risk_env == RiskEnvironment::Favorable {
        (InvestmentStance::Aggressive, 0.8)
    } else if regime == MarketRegime::Bear || risk_env == RiskEnvironment::Challenging {
        (InvestmentStance::Defensive, 0.75)
    } else {
        (InvestmentStance::Balanced, 0.65)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_unknown_regime() {
        let indicators = fallback_indicators();
        assert_eq!(market_regime(&indicators), MarketRegime::Unknown);
    }

    #[test]
    fn favorable_environment_yields_aggressive_stance() {
        let mut indicators = fallback_indicators();
        indicators.gdp_growth = Some(3.0);
        indicators.cpi_yoy = Some(2.0);
        indicators.risk_appetite = 0.8;
        indicators.liquidity_score = 0.8;
        let regime = market_regime(&indicators);
        assert_eq!(regime, MarketRegime::Bull);
        let (risk_env, _) = risk_environment(&indicators);
        assert_eq!(risk_env, RiskEnvironment::Favorable);
        let (stance, _) = investment_stance(regime, risk_env);
        assert_eq!(stance, InvestmentStance::Aggressive);
    }
}
