//! Strategy back-testing (§4.10): `buy_and_hold`, `momentum`,
//! `mean_reversion` over a synthetic daily-close series, with the standard
//! return/Sharpe/drawdown metrics (Glossary, §4.10).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyType {
    BuyAndHold,
    Momentum,
    MeanReversion,
}

impl StrategyType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buy_and_hold" => Some(Self::BuyAndHold),
            "momentum" => Some(Self::Momentum),
            "mean_reversion" => Some(Self::MeanReversion),
            _ => None,
        }
    }
}

fn sma(closes: &[f64], upto: usize, n: usize) -> Option<f64> {
    if upto < n {
        return None;
    }
    let window = &closes[upto - n..upto];
    Some(window.iter().sum::<f64>() / n as f64)
}

fn stdev(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    variance.sqrt()
}

/// Units held per entry: fractional when the instrument's starting close
/// exceeds 500, integer otherwise (§4.10).
pub fn position_units(starting_close: f64, dollars: f64, price: f64) -> f64 {
    let raw = dollars / price;
    if starting_close > 500.0 {
        raw
    } else {
        raw.floor().max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub symbol: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub benchmark_return: f64,
    pub alpha: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub trade_count: u32,
}

/// Runs one strategy over `closes` (oldest first) starting with
/// `initial_capital`, returning the equity path (parallel to `closes`).
fn equity_path(strategy: StrategyType, closes: &[f64], initial_capital: f64) -> (Vec<f64>, u32) {
    let starting_close = closes[0];
    let mut cash = initial_capital;
    let mut units = 0.0_f64;
    let mut trades = 0u32;
    let mut equity = Vec::with_capacity(closes.len());

    for (i, &price) in closes.iter().enumerate() {
        let in_position = units > 0.0;
        let should_enter = match strategy {
            StrategyType::BuyAndHold => i == 0 && !in_position,
            StrategyType::Momentum => {
                !in_position
                    && sma(closes, i + 1, 20)
                        .map(|avg| price > avg)
                        .unwrap_or(false)
            }
            StrategyType::MeanReversion => {
                if i < 21 {
                    false
                } else {
                    let returns: Vec<f64> =
                        closes[i - 20..=i].windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
                    let sigma = stdev(&returns) * 20.0_f64.sqrt();
                    let avg = sma(closes, i + 1, 20).unwrap_or(price);
                    !in_position && sigma > 0.0 && price < avg - sigma * 0.5
                }
            }
        };
        let should_exit = match strategy {
            StrategyType::BuyAndHold => false,
            StrategyType::Momentum => {
                in_position
                    && sma(closes, i + 1, 20)
                        .map(|avg| price < avg)
                        .unwrap_or(false)
            }
            StrategyType::MeanReversion => {
                if i < 21 {
                    false
                } else {
                    let returns: Vec<f64> =
                        closes[i - 20..=i].windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
                    let sigma = stdev(&returns) * 20.0_f64.sqrt();
                    let avg = sma(closes, i + 1, 20).unwrap_or(price);
                    in_position && sigma > 0.0 && price > avg + sigma * 0.5
                }
            }
        };

        if should_exit && in_position {
            cash += units * price;
            units = 0.0;
            trades += 1;
        }
        if should_enter && units == 0.0 {
            let size = position_units(starting_close, cash, price);
            if size > 0.0 {
                units = size;
                cash -= units * price;
                trades += 1;
            }
        }

        equity.push(cash + units * price);
    }

    (equity, trades)
}

pub fn run_backtest(strategy: StrategyType, symbol: &str, closes: &[f64], initial_capital: f64) -> BacktestResult {
    let (equity, trade_count) = equity_path(strategy, closes, initial_capital);
    let final_value = *equity.last().unwrap_or(&initial_capital);
    let total_return = (final_value / initial_capital) - 1.0;

    let benchmark_final = initial_capital / closes[0] * closes[closes.len() - 1];
    let benchmark_return = (benchmark_final / initial_capital) - 1.0;

    let daily_returns: Vec<f64> = equity.windows(2).map(|w| (w[1] - w[0]) / w[0].max(1e-9)).collect();
    let mean_daily = if daily_returns.is_empty() {
        0.0
    } else {
        daily_returns.iter().sum::<f64>() / daily_returns.len() as f64
    };
    let sigma_daily = stdev(&daily_returns);
    let sharpe_ratio = if sigma_daily > 0.0 {
        (mean_daily / sigma_daily) * 252.0_f64.sqrt()
    } else {
        0.0
    };

    let mut peak = equity.first().copied().unwrap_or(initial_capital);
    let mut max_drawdown = 0.0_f64;
    for &value in &equity {
        peak = peak.max(value);
        let drawdown = (peak - value) / peak.max(1e-9);
        max_drawdown = max_drawdown.max(drawdown);
    }

    BacktestResult {
        strategy: match strategy {
            StrategyType::BuyAndHold => "buy_and_hold".to_string(),
            StrategyType::Momentum => "momentum".to_string(),
            StrategyType::MeanReversion => "mean_reversion".to_string(),
        },
        symbol: symbol.to_string(),
        initial_capital,
        final_value,
        total_return,
        benchmark_return,
        alpha: total_return - benchmark_return,
        sharpe_ratio,
        max_drawdown,
        trade_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::daily_closes;

    #[test]
    fn buy_and_hold_tracks_the_benchmark() {
        let closes = daily_closes("AAPL", 120);
        let result = run_backtest(StrategyType::BuyAndHold, "AAPL", &closes, 10_000.0);
        assert!((result.total_return - result.benchmark_return).abs() < 1e-6);
        assert_eq!(result.trade_count, 1);
    }

    #[test]
    fn integer_units_below_500_starting_close() {
        assert_eq!(position_units(100.0, 1050.0, 100.0), 10.0);
    }

    #[test]
    fn fractional_units_above_500_starting_close() {
        let units = position_units(600.0, 1050.0, 100.0);
        assert!((units - 10.5).abs() < 1e-9);
    }
}
