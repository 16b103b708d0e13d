//! The sole owner of `Portfolio` state (§4.5, §9): every mutation serializes
//! on one mutex; reads see a fully-applied snapshot or the prior one, never
//! an intermediate state (§5).

use shared_models::portfolio::{Portfolio, Position, TransactionRecord};
use shared_models::time::now_iso;
use shared_models::trade::TradeAction;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct PortfolioStore {
    portfolio: Mutex<Portfolio>,
}

impl PortfolioStore {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            portfolio: Mutex::new(Portfolio::new(initial_cash)),
        }
    }

    pub fn snapshot(&self) -> Portfolio {
        self.portfolio.lock().expect("portfolio lock poisoned").clone()
    }

    pub fn reset(&self, initial_cash: f64) {
        let mut guard = self.portfolio.lock().expect("portfolio lock poisoned");
        *guard = Portfolio::new(initial_cash);
    }

    pub fn update_position_prices(&self, prices: &HashMap<String, f64>) {
        let mut guard = self.portfolio.lock().expect("portfolio lock poisoned");
        for (symbol, price) in prices {
            if let Some(position) = guard.positions.get_mut(symbol) {
                position.mark(*price);
            }
        }
        guard.last_updated = now_iso();
    }

    /// Applies one BUY/SELL leg under the portfolio lock (§4.5 mutation
    /// rules). Returns the appended `TransactionRecord` on success, or a
    /// refusal reason string — never panics across this boundary (§7).
    pub fn apply_trade(
        &self,
        trade_id: &str,
        symbol: &str,
        action: TradeAction,
        quantity: f64,
        price: f64,
        risk_score: f64,
    ) -> Result<TransactionRecord, String> {
        if quantity <= 0.0 {
            return Err("quantity must be positive".to_string());
        }
        if price <= 0.0 {
            return Err("price must be positive".to_string());
        }

        let trade_value = quantity * price;
        let mut guard = self.portfolio.lock().expect("portfolio lock poisoned");

        match action {
            TradeAction::Buy => {
                if guard.cash < trade_value {
                    return Err(format!(
                        "insufficient cash: have {:.2}, need {trade_value:.2}",
                        guard.cash
                    ));
                }
                guard.cash -= trade_value;
                match guard.positions.get_mut(symbol) {
                    Some(position) => {
                        let new_qty = position.quantity + quantity;
                        position.average_cost =
                            (position.average_cost * position.quantity + trade_value) / new_qty;
                        position.quantity = new_qty;
                        position.mark(price);
                    }
                    None => {
                        let mut position = Position {
                            quantity,
                            average_cost: price,
                            current_price: price,
                            current_value: 0.0,
                        };
                        position.mark(price);
                        guard.positions.insert(symbol.to_string(), position);
                    }
                }
            }
            TradeAction::Sell => {
                let held = guard.positions.get(symbol).map(|p| p.quantity).unwrap_or(0.0);
                if held < quantity {
                    return Err(format!("insufficient position: hold {held}, need {quantity}"));
                }
                guard.cash += trade_value;
                let remove = {
                    let position = guard.positions.get_mut(symbol).expect("checked above");
                    position.quantity -= quantity;
                    position.mark(price);
                    position.quantity == 0.0
                };
                // invariant: a zero-quantity position is absent from the map (§3, §8).
                if remove {
                    guard.positions.remove(symbol);
                }
            }
        }

        let record = TransactionRecord {
            trade_id: trade_id.to_string(),
            timestamp: now_iso(),
            symbol: symbol.to_string(),
            action,
            quantity,
            price,
            value: trade_value,
            risk_score,
        };
        guard.transaction_history.push(record.clone());
        guard.last_updated = now_iso();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_small_buy_updates_cash_and_position() {
        // §8 S2: cash=100000, BUY 0.1 @ 48000 -> cash=95200, avg=48000.
        let store = PortfolioStore::new(100_000.0);
        let record = store
            .apply_trade("T1", "SYM", TradeAction::Buy, 0.1, 48_000.0, 0.2)
            .expect("buy should succeed");
        assert_eq!(record.value, 4_800.0);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.cash, 95_200.0);
        let position = snapshot.positions.get("SYM").expect("position created");
        assert_eq!(position.quantity, 0.1);
        assert_eq!(position.average_cost, 48_000.0);
    }

    #[test]
    fn buy_exactly_equal_to_cash_succeeds_one_dollar_more_fails() {
        let store = PortfolioStore::new(4_800.0);
        assert!(store.apply_trade("T1", "SYM", TradeAction::Buy, 0.1, 48_000.0, 0.1).is_ok());
        let store = PortfolioStore::new(4_799.0);
        assert!(store.apply_trade("T2", "SYM", TradeAction::Buy, 0.1, 48_000.0, 0.1).is_err());
    }

    #[test]
    fn sell_to_zero_removes_position() {
        let store = PortfolioStore::new(0.0);
        store
            .apply_trade("T1", "SYM", TradeAction::Buy, 1.0, 100.0, 0.1)
            .unwrap();
        store
            .apply_trade("T2", "SYM", TradeAction::Sell, 1.0, 110.0, 0.1)
            .unwrap();
        let snapshot = store.snapshot();
        assert!(!snapshot.positions.contains_key("SYM"));
        assert_eq!(snapshot.cash, 110.0);
    }

    #[test]
    fn sell_preserves_average_cost() {
        let store = PortfolioStore::new(0.0);
        store
            .apply_trade("T1", "SYM", TradeAction::Buy, 2.0, 100.0, 0.1)
            .unwrap();
        store
            .apply_trade("T2", "SYM", TradeAction::Sell, 1.0, 150.0, 0.1)
            .unwrap();
        let snapshot = store.snapshot();
        let position = snapshot.positions.get("SYM").unwrap();
        assert_eq!(position.average_cost, 100.0);
        assert_eq!(position.quantity, 1.0);
    }

    #[test]
    fn sell_more_than_held_is_refused() {
        let store = PortfolioStore::new(0.0);
        store
            .apply_trade("T1", "SYM", TradeAction::Buy, 1.0, 100.0, 0.1)
            .unwrap();
        assert!(store.apply_trade("T2", "SYM", TradeAction::Sell, 2.0, 100.0, 0.1).is_err());
    }

    #[test]
    fn reset_restores_initial_state() {
        let store = PortfolioStore::new(1_000.0);
        store.apply_trade("T1", "SYM", TradeAction::Buy, 1.0, 100.0, 0.1).unwrap();
        store.reset(5_000.0);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.cash, 5_000.0);
        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.transaction_history.len(), 0);
    }
}
