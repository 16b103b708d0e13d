//! Valuation/quality/growth scoring (§4.3 Fundamental), grounded on a
//! typical `calculate_valuation_score`/`calculate_quality_score` pair plus
//! the growth-clipped-to-20%-YoY rule.

use crate::provider::CompanyInfo;

/// Valuation in [0,1] from P/E, P/B, PEG thresholds, starting neutral at
/// 0.5 and nudged by each ratio (source `calculate_valuation_score`).
pub fn valuation_score(info: &CompanyInfo) -> f64 {
    let mut score = 0.5;
    if info.pe_ratio > 0.0 {
        if info.pe_ratio < 15.0 {
            score += 0.15;
        } else if info.pe_ratio > 30.0 {
            score -= 0.15;
        }
    }
    if info.pb_ratio > 0.0 {
        if info.pb_ratio < 2.0 {
            score += 0.1;
        } else if info.pb_ratio > 5.0 {
            score -= 0.1;
        }
    }
    if info.peg_ratio > 0.0 {
        if info.peg_ratio < 1.0 {
            score += 0.2;
        } else if info.peg_ratio > 2.0 {
            score -= 0.2;
        }
    }
    score.clamp(0.0, 1.0)
}

/// Quality in [0,1] from margins, ROE, leverage (source
/// `calculate_quality_score`).
pub fn quality_score(info: &CompanyInfo) -> f64 {
    let mut score = 0.5;
    if info.profit_margin > 0.15 {
        score += 0.2;
    } else if info.profit_margin < 0.05 {
        score -= 0.2;
    }
    if info.roe > 0.15 {
        score += 0.2;
    } else if info.roe < 0.05 {
        score -= 0.2;
    }
    if info.debt_to_equity > 0.0 && info.debt_to_equity < 0.5 {
        score += 0.1;
    } else if info.debt_to_equity > 2.0 {
        score -= 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Growth in [0,1] from revenue/earnings YoY clipped to +/-20% (see
/// §4.3: "clipped to +/-20%").
pub fn growth_score(info: &CompanyInfo) -> f64 {
    let avg_growth = (info.revenue_growth + info.earnings_growth) / 2.0;
    (avg_growth.abs() / 0.20).min(1.0)
}

/// Overall = 0.3*val + 0.4*quality + 0.3*growth (§4.3 Fundamental).
pub fn overall_score(valuation: f64, quality: f64, growth: f64) -> f64 {
    0.3 * valuation + 0.4 * quality + 0.3 * growth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::AnalystConsensus;

    fn sample() -> CompanyInfo {
        CompanyInfo {
            company_name: "Test Corp".into(),
            market_cap: 1.0e11,
            pe_ratio: 12.0,
            pb_ratio: 1.5,
            peg_ratio: 0.8,
            profit_margin: 0.20,
            roe: 0.22,
            revenue_growth: 0.10,
            earnings_growth: 0.14,
            debt_to_equity: 0.3,
            analyst_consensus: AnalystConsensus::Buy,
        }
    }

    #[test]
    fn strong_fundamentals_score_above_neutral() {
        let info = sample();
        assert!(valuation_score(&info) > 0.5);
        assert!(quality_score(&info) > 0.5);
    }

    #[test]
    fn growth_is_clipped_to_one() {
        let mut info = sample();
        info.revenue_growth = 1.0;
        info.earnings_growth = 1.0;
        assert_eq!(growth_score(&info), 1.0);
    }
}
