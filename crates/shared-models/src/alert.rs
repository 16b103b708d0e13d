//! Price alerts, owned exclusively by the notification gateway (C9).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    Above,
    Below,
    CrossesAbove,
    CrossesBelow,
}

impl AlertCondition {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "above" => Some(Self::Above),
            "below" => Some(Self::Below),
            "crosses_above" => Some(Self::CrossesAbove),
            "crosses_below" => Some(Self::CrossesBelow),
            _ => None,
        }
    }

    /// Evaluate this condition against the current price and the previous
    /// observation. Crossing conditions require `last_price` to be
    /// `Some` — on the first observation they can never fire (§8 invariant).
    pub fn fires(&self, current: f64, threshold: f64, last_price: Option<f64>) -> bool {
        match self {
            AlertCondition::Above => current > threshold,
            AlertCondition::Below => current < threshold,
            AlertCondition::CrossesAbove => match last_price {
                Some(prev) => prev <= threshold && current > threshold,
                None => false,
            },
            AlertCondition::CrossesBelow => match last_price {
                Some(prev) => prev >= threshold && current < threshold,
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub symbol: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    pub channel: Option<String>,
    pub owner: Option<String>,
    pub created_at: String,
    pub triggered: bool,
    pub trigger_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_price: Option<f64>,
    pub last_price: Option<f64>,
    pub last_checked: Option<String>,
}

impl Alert {
    pub fn new(
        alert_id: impl Into<String>,
        symbol: impl Into<String>,
        condition: AlertCondition,
        threshold: f64,
        channel: Option<String>,
        owner: Option<String>,
    ) -> Self {
        Self {
            alert_id: alert_id.into(),
            symbol: symbol.into(),
            condition,
            threshold,
            channel,
            owner,
            created_at: crate::time::now_iso(),
            triggered: false,
            trigger_count: 0,
            triggered_at: None,
            triggered_price: None,
            last_price: None,
            last_checked: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_never_fires_on_first_observation() {
        assert!(!AlertCondition::CrossesAbove.fires(105.0, 100.0, None));
        assert!(!AlertCondition::CrossesBelow.fires(95.0, 100.0, None));
    }

    #[test]
    fn crossing_fires_once_a_prior_observation_exists() {
        assert!(AlertCondition::CrossesAbove.fires(105.0, 100.0, Some(95.0)));
        assert!(!AlertCondition::CrossesAbove.fires(105.0, 100.0, Some(101.0)));
    }
}
