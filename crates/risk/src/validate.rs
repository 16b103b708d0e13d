//! Pure validation functions (§4.4): proposal + policy -> `RiskVerdict`.
//! No I/O, no portfolio access — the validator never sees portfolio state.

use shared_models::policy::RiskPolicy;
use shared_models::trade::RiskVerdict;

/// Trade validation (§4.4): the violation set is empty iff confidence >=
/// min_confidence AND volatility <= max_volatility AND position_size_fraction
/// <= max_position_fraction AND trade_value <= max_single_trade_value.
pub fn validate_trade(
    policy: &RiskPolicy,
    confidence: f64,
    volatility: f64,
    position_size_fraction: f64,
    trade_value: f64,
) -> RiskVerdict {
    let mut violations = Vec::new();

    if confidence < policy.min_confidence {
        violations.push(format!(
            "confidence {confidence:.2} below minimum {:.2}",
            policy.min_confidence
        ));
    }
    if volatility > policy.max_volatility {
        violations.push(format!(
            "volatility {volatility:.2} exceeds maximum {:.2}",
            policy.max_volatility
        ));
    }
    if position_size_fraction > policy.max_position_fraction {
        violations.push(format!(
            "position size fraction {position_size_fraction:.2} exceeds maximum {:.2}",
            policy.max_position_fraction
        ));
    }
    if trade_value > policy.max_single_trade_value {
        violations.push(format!(
            "trade value {trade_value:.2} exceeds maximum {:.2}",
            policy.max_single_trade_value
        ));
    }

    // risk_score = mean of three normalized factors, each clamped to [0,1]
    // (§4.4); informational only, never a gate on its own (Glossary).
    let vol_factor = (volatility / policy.max_volatility).clamp(0.0, 1.0);
    let confidence_factor = (1.0 - confidence).clamp(0.0, 1.0);
    let size_factor = (position_size_fraction / policy.max_position_fraction).clamp(0.0, 1.0);
    let risk_score = (vol_factor + confidence_factor + size_factor) / 3.0;

    let mut verdict = RiskVerdict::new(violations, risk_score);
    verdict.position_size_fraction = Some(position_size_fraction);
    verdict
}

/// Rebalance validation (§4.4): turnover_fraction must be <= the caller-
/// supplied max, and each individual change's value fraction must be <=
/// max_position_fraction.
pub fn validate_rebalance(
    policy: &RiskPolicy,
    turnover_fraction: f64,
    max_turnover_fraction: f64,
    change_fractions: &[(String, f64)],
) -> RiskVerdict {
    let mut violations = Vec::new();

    if turnover_fraction > max_turnover_fraction {
        violations.push(format!(
            "turnover fraction {turnover_fraction:.2} exceeds maximum {max_turnover_fraction:.2}"
        ));
    }

    for (symbol, fraction) in change_fractions {
        if *fraction > policy.max_position_fraction {
            violations.push(format!(
                "{symbol} change fraction {fraction:.2} exceeds maximum {:.2}",
                policy.max_position_fraction
            ));
        }
    }

    let turnover_factor = (turnover_fraction / max_turnover_fraction.max(f64::EPSILON)).clamp(0.0, 1.0);
    let worst_change_factor = change_fractions
        .iter()
        .map(|(_, f)| (*f / policy.max_position_fraction).clamp(0.0, 1.0))
        .fold(0.0_f64, f64::max);
    let risk_score = (turnover_factor + worst_change_factor) / 2.0;

    let mut verdict = RiskVerdict::new(violations, risk_score);
    verdict.turnover_fraction = Some(turnover_fraction);
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_oversized_position_is_rejected() {
        // §8 S1: position_size_fraction=0.24 fails max_position_fraction=0.15.
        let policy = RiskPolicy::default();
        let verdict = validate_trade(&policy, 0.648, 0.35, 0.24, 24_000.0);
        assert!(!verdict.approved);
        assert!(verdict.violations.iter().any(|v| v.contains("position size")));
    }

    #[test]
    fn s2_small_trade_is_approved() {
        // §8 S2: fraction=0.048, confidence~0.648, all checks pass.
        let policy = RiskPolicy::default();
        let verdict = validate_trade(&policy, 0.648, 0.35, 0.048, 4_800.0);
        assert!(verdict.approved);
        assert!(verdict.violations.is_empty());
    }

    #[test]
    fn approved_iff_violations_empty() {
        let policy = RiskPolicy::default();
        let approved = validate_trade(&policy, 0.9, 0.1, 0.05, 1_000.0);
        let rejected = validate_trade(&policy, 0.1, 0.9, 0.9, 50_000.0);
        assert_eq!(approved.approved, approved.violations.is_empty());
        assert_eq!(rejected.approved, rejected.violations.is_empty());
        assert!(approved.approved);
        assert!(!rejected.approved);
    }

    #[test]
    fn rebalance_flags_excess_turnover() {
        let policy = RiskPolicy::default();
        let verdict = validate_rebalance(&policy, 0.45, 0.30, &[("A".to_string(), 0.05)]);
        assert!(!verdict.approved);
        assert!(verdict.violations.iter().any(|v| v.contains("turnover")));
    }

    #[test]
    fn rebalance_within_bounds_is_approved() {
        let policy = RiskPolicy::default();
        let verdict = validate_rebalance(&policy, 0.10, 0.30, &[("A".to_string(), 0.05)]);
        assert!(verdict.approved);
    }
}
