//! Read-only portfolio health and rebalance math (§4.6). Operates entirely
//! on a portfolio snapshot handed in by the caller — this service never
//! reaches into C5's state directly (§9 strict layering).

use serde::Deserialize;
use shared_models::trade::{Change, TradeAction};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct PositionView {
    pub quantity: f64,
    #[serde(default)]
    pub average_cost: f64,
    pub current_price: f64,
    pub current_value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioView {
    pub cash: f64,
    pub positions: HashMap<String, PositionView>,
}

impl PortfolioView {
    pub fn total_value(&self) -> f64 {
        self.cash + self.positions.values().map(|p| p.current_value).sum::<f64>()
    }

    pub fn weights(&self) -> HashMap<String, f64> {
        let total = self.total_value();
        if total <= 0.0 {
            return HashMap::new();
        }
        self.positions
            .iter()
            .map(|(symbol, position)| (symbol.clone(), position.current_value / total))
            .collect()
    }
}

/// Herfindahl concentration: sum of squared position weights, in [0,1]
/// (Glossary).
pub fn concentration(weights: &HashMap<String, f64>) -> f64 {
    weights.values().map(|w| w * w).sum()
}

/// 1 - concentration when more than one position is held, else 0 (§4.6).
pub fn diversification(weights: &HashMap<String, f64>, concentration: f64) -> f64 {
    if weights.len() > 1 {
        1.0 - concentration
    } else {
        0.0
    }
}

pub fn cash_health(cash_fraction: f64) -> f64 {
    if (0.2..=0.4).contains(&cash_fraction) {
        1.0
    } else if cash_fraction < 0.1 || cash_fraction > 0.5 {
        0.3
    } else {
        0.7
    }
}

/// Arithmetic mean of diversification, cash-health, and 1-concentration
/// (§4.6).
pub fn health_score(diversification: f64, cash_health: f64, concentration: f64) -> f64 {
    (diversification + cash_health + (1.0 - concentration)) / 3.0
}

pub fn health_rating(score: f64) -> &'static str {
    if score > 0.75 {
        "EXCELLENT"
    } else if score > 0.60 {
        "GOOD"
    } else if score > 0.45 {
        "FAIR"
    } else {
        "POOR"
    }
}

/// Positions whose weight exceeds 20% (§4.6).
pub fn overexposed(weights: &HashMap<String, f64>) -> Vec<String> {
    let mut symbols: Vec<String> = weights
        .iter()
        .filter(|(_, w)| **w > 0.20)
        .map(|(s, _)| s.clone())
        .collect();
    symbols.sort();
    symbols
}

const REBALANCE_THRESHOLD_FRACTION: f64 = 0.02;

/// Generates a `Change` for every symbol whose absolute weight diff times
/// total value exceeds 2% of total value (§4.6). Symbols present in
/// `target_allocation` but not currently held are skipped — without a live
/// price this read-only service cannot size an opening BUY; the supervisor
/// is expected to only target currently-held symbols (§4.7 step 5).
pub fn generate_rebalance_changes(
    view: &PortfolioView,
    target_allocation: &HashMap<String, f64>,
) -> (Vec<Change>, f64) {
    let total_value = view.total_value();
    let current_weights = view.weights();
    let mut changes = Vec::new();

    let mut symbols: Vec<&String> = current_weights.keys().chain(target_allocation.keys()).collect();
    symbols.sort();
    symbols.dedup();

    for symbol in symbols {
        let current_weight = *current_weights.get(symbol).unwrap_or(&0.0);
        let target_weight = *target_allocation.get(symbol).unwrap_or(&0.0);
        let weight_diff = target_weight - current_weight;

        if weight_diff.abs() * total_value <= REBALANCE_THRESHOLD_FRACTION * total_value {
            continue;
        }

        let Some(position) = view.positions.get(symbol) else {
            continue; // no current price to size an opening BUY (see doc above)
        };
        if position.current_price <= 0.0 {
            continue;
        }

        let value_diff = weight_diff * total_value;
        let action = if target_weight > current_weight {
            TradeAction::Buy
        } else {
            TradeAction::Sell
        };
        let quantity = value_diff.abs() / position.current_price;

        changes.push(Change {
            symbol: symbol.clone(),
            action,
            quantity,
            price: position.current_price,
            value: value_diff.abs(),
            current_weight,
            target_weight,
        });
    }

    let total_turnover = changes.iter().map(|c| c.value).sum::<f64>();
    (changes, total_turnover)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> PortfolioView {
        let mut positions = HashMap::new();
        positions.insert(
            "A".to_string(),
            PositionView {
                quantity: 10.0,
                average_cost: 10.0,
                current_price: 10.0,
                current_value: 100.0,
            },
        );
        positions.insert(
            "B".to_string(),
            PositionView {
                quantity: 5.0,
                average_cost: 20.0,
                current_price: 20.0,
                current_value: 100.0,
            },
        );
        PortfolioView { cash: 800.0, positions }
    }

    #[test]
    fn single_position_has_zero_diversification() {
        let mut positions = HashMap::new();
        positions.insert(
            "A".to_string(),
            PositionView {
                quantity: 1.0,
                average_cost: 100.0,
                current_price: 100.0,
                current_value: 100.0,
            },
        );
        let view = PortfolioView { cash: 0.0, positions };
        let weights = view.weights();
        let c = concentration(&weights);
        assert_eq!(diversification(&weights, c), 0.0);
    }

    #[test]
    fn concentration_is_sum_of_squares() {
        let view = sample_view();
        let weights = view.weights();
        let total = view.total_value();
        assert_eq!(total, 1000.0);
        let expected = (0.1_f64).powi(2) * 2.0;
        assert!((concentration(&weights) - expected).abs() < 1e-9);
    }

    #[test]
    fn health_rating_bands() {
        assert_eq!(health_rating(0.80), "EXCELLENT");
        assert_eq!(health_rating(0.65), "GOOD");
        assert_eq!(health_rating(0.50), "FAIR");
        assert_eq!(health_rating(0.20), "POOR");
    }

    #[test]
    fn rebalance_emits_changes_only_above_threshold() {
        let view = sample_view();
        let mut target = HashMap::new();
        target.insert("A".to_string(), 0.30); // 0.1 -> 0.30, well above 2% threshold
        target.insert("B".to_string(), 0.101); // 0.1 -> 0.101, below threshold
        let (changes, _) = generate_rebalance_changes(&view, &target);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].symbol, "A");
        assert_eq!(changes[0].action, TradeAction::Buy);
    }
}
