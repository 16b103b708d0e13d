//! Proposals exchanged between the supervisors (C7), the risk validator
//! (C4) and the execution engine (C5).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
        }
    }
}

/// Built once by a supervisor, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeProposal {
    pub trade_id: String,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub aggregated_confidence: f64,
    pub volatility: f64,
    pub position_size_fraction: f64,
    pub trade_value: f64,
    pub contributing_signals: HashMap<String, serde_json::Value>,
}

/// A single leg of a `RebalanceProposal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub value: f64,
    pub current_weight: f64,
    pub target_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceProposal {
    pub review_id: String,
    pub changes: Vec<Change>,
    pub total_turnover: f64,
    pub turnover_fraction: f64,
    pub target_allocation: HashMap<String, f64>,
    pub rationale: String,
}

/// Pure function output of the risk validator. `approved` is always exactly
/// `violations.is_empty()` — see §8 invariant v.approved <=> v.violations
/// is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub approved: bool,
    pub risk_score: f64,
    pub violations: Vec<String>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnover_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_size_fraction: Option<f64>,
}

impl RiskVerdict {
    pub fn new(violations: Vec<String>, risk_score: f64) -> Self {
        let approved = violations.is_empty();
        let reason = if approved {
            "Approved - within policy bounds".to_string()
        } else {
            format!("Rejected - {} violation(s)", violations.len())
        };
        Self {
            approved,
            risk_score: risk_score.clamp(0.0, 1.0),
            violations,
            reason,
            turnover_fraction: None,
            position_size_fraction: None,
        }
    }
}
