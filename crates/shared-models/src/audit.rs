//! Append-only audit events, owned exclusively by the compliance log (C8).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Proposal,
    RiskDecision,
    Execution,
    Error,
    System,
}

use crate::severity::Severity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub utc_timestamp: String,
    pub event_type: EventType,
    pub producer: String,
    pub action: String,
    pub payload: HashMap<String, Value>,
    pub severity: Severity,
}

/// Formats a monotone counter as `EVT_000001` per §9's numeric-identifier
/// convention.
pub fn format_event_id(counter: u64) -> String {
    format!("EVT_{counter:06}")
}
