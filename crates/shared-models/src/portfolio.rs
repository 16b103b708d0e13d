//! The portfolio owned exclusively by the execution engine (C5). Nothing
//! outside that crate may construct a mutated `Portfolio` — everyone else
//! only ever sees a cloned snapshot.

use crate::trade::TradeAction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub quantity: f64,
    pub average_cost: f64,
    pub current_price: f64,
    pub current_value: f64,
}

impl Position {
    pub fn mark(&mut self, price: f64) {
        self.current_price = price;
        self.current_value = self.quantity * price;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub trade_id: String,
    pub timestamp: String,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub value: f64,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash: f64,
    pub positions: HashMap<String, Position>,
    pub transaction_history: Vec<TransactionRecord>,
    pub last_updated: String,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            positions: HashMap::new(),
            transaction_history: Vec::new(),
            last_updated: crate::time::now_iso(),
        }
    }

    pub fn positions_value(&self) -> f64 {
        self.positions.values().map(|p| p.current_value).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.cash + self.positions_value()
    }

    pub fn cash_fraction(&self) -> f64 {
        let total = self.total_value();
        if total > 0.0 {
            self.cash / total
        } else {
            1.0
        }
    }

    pub fn invested_fraction(&self) -> f64 {
        1.0 - self.cash_fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_value_is_cash_plus_positions() {
        let mut p = Portfolio::new(1_000.0);
        p.positions.insert(
            "SYM".into(),
            Position {
                quantity: 2.0,
                average_cost: 10.0,
                current_price: 12.0,
                current_value: 24.0,
            },
        );
        assert_eq!(p.total_value(), 1_024.0);
    }
}
