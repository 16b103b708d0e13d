//! Tool handlers for the compliance log (C8 / §4.8): `log_event`,
//! `generate_audit_report`, `get_recent_events`, `get_compliance_metrics`,
//! `clear_audit_log`.

use crate::log::ComplianceLog;
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::audit::EventType;
use shared_models::severity::Severity;
use std::collections::HashMap;
use std::sync::Arc;

fn parse_event_type(s: &str) -> EventType {
    match s {
        "proposal" => EventType::Proposal,
        "risk_decision" => EventType::RiskDecision,
        "execution" => EventType::Execution,
        "error" => EventType::Error,
        _ => EventType::System,
    }
}

fn event_type_str(event_type: &EventType) -> &'static str {
    match event_type {
        EventType::Proposal => "proposal",
        EventType::RiskDecision => "risk_decision",
        EventType::Execution => "execution",
        EventType::Error => "error",
        EventType::System => "system",
    }
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<ComplianceLog>) {
    let s = state.clone();
    registry.register(
        "log_event",
        "Append an audit event to the compliance log.",
        json!({
            "type": "object",
            "properties": {
                "event_type": { "type": "string" },
                "producer": { "type": "string" },
                "action": { "type": "string" },
                "payload": { "type": "object" },
                "severity": { "type": "string" },
            },
            "required": ["event_type", "producer", "action"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let event_type = args
                    .get("event_type")
                    .and_then(Value::as_str)
                    .map(parse_event_type)
                    .unwrap_or(EventType::System);
                let producer = args
                    .get("producer")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("producer must be a string"))?;
                let action = args
                    .get("action")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("action must be a string"))?;
                let payload: HashMap<String, Value> = args
                    .get("payload")
                    .and_then(Value::as_object)
                    .map(|o| o.clone().into_iter().collect())
                    .unwrap_or_default();
                let severity = args
                    .get("severity")
                    .and_then(Value::as_str)
                    .map(Severity::parse)
                    .unwrap_or(Severity::Info);

                let event = state.log_event(event_type, producer, action, payload, severity);
                Ok(serde_json::to_value(event).unwrap_or(Value::Null))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "get_recent_events",
        "Return the most recent audit events, optionally filtered by type.",
        json!({
            "type": "object",
            "properties": {
                "limit": { "type": "integer" },
                "event_type": { "type": "string" },
            },
        }),
        move |args| {
            let state = s.clone();
            async move {
                let limit = args.get("limit").and_then(Value::as_u64).unwrap_or(50) as usize;
                let filter = args.get("event_type").and_then(Value::as_str).map(parse_event_type);

                let events = state.snapshot();
                let filtered: Vec<_> = events
                    .into_iter()
                    .rev()
                    .filter(|e| filter.is_none_or(|f| event_type_str(&f) == event_type_str(&e.event_type)))
                    .take(limit)
                    .collect();
                Ok(json!({ "events": filtered, "count": filtered.len() }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "generate_audit_report",
        "Aggregate audit events by type, producer, and severity, with approval/execution rates.",
        json!({
            "type": "object",
            "properties": {
                "event_type": { "type": "string" },
                "producer": { "type": "string" },
            },
        }),
        move |args| {
            let state = s.clone();
            async move {
                let type_filter = args.get("event_type").and_then(Value::as_str).map(parse_event_type);
                let producer_filter = args.get("producer").and_then(Value::as_str);

                let events: Vec<_> = state
                    .snapshot()
                    .into_iter()
                    .filter(|e| type_filter.is_none_or(|f| event_type_str(&f) == event_type_str(&e.event_type)))
                    .filter(|e| producer_filter.is_none_or(|p| p == e.producer))
                    .collect();

                let mut by_type: HashMap<&'static str, u64> = HashMap::new();
                let mut by_producer: HashMap<String, u64> = HashMap::new();
                let mut by_severity: HashMap<&'static str, u64> = HashMap::new();
                let mut risk_decisions = 0u64;
                let mut risk_approvals = 0u64;
                let mut executions = 0u64;
                let mut execution_successes = 0u64;

                for event in &events {
                    *by_type.entry(event_type_str(&event.event_type)).or_insert(0) += 1;
                    *by_producer.entry(event.producer.clone()).or_insert(0) += 1;
                    *by_severity.entry(event.severity.as_str()).or_insert(0) += 1;

                    if matches!(event.event_type, EventType::RiskDecision) {
                        risk_decisions += 1;
                        if event.payload.get("approved").and_then(Value::as_bool).unwrap_or(false) {
                            risk_approvals += 1;
                        }
                    }
                    if matches!(event.event_type, EventType::Execution) {
                        executions += 1;
                        if event.payload.get("success").and_then(Value::as_bool).unwrap_or(false) {
                            execution_successes += 1;
                        }
                    }
                }

                let approval_rate = if risk_decisions > 0 {
                    risk_approvals as f64 / risk_decisions as f64
                } else {
                    0.0
                };
                let execution_success_rate = if executions > 0 {
                    execution_successes as f64 / executions as f64
                } else {
                    0.0
                };

                Ok(json!({
                    "total_events": events.len(),
                    "by_type": by_type,
                    "by_producer": by_producer,
                    "by_severity": by_severity,
                    "approval_rate": approval_rate,
                    "execution_success_rate": execution_success_rate,
                }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "get_compliance_metrics",
        "Summarize total event counts, approval rate, and execution success rate.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move {
                let events = state.snapshot();
                let total = events.len();
                let critical = events.iter().filter(|e| e.severity == Severity::Critical).count();
                Ok(json!({
                    "total_events": total,
                    "critical_events": critical,
                }))
            }
        },
    );

    let s = state;
    registry.register(
        "clear_audit_log",
        "Clear the audit log (demo/testing only; §9 Open Question 3).",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move {
                state.clear();
                Ok(json!({ "cleared": true }))
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_event_twice_produces_distinct_ids() {
        let state = Arc::new(ComplianceLog::new(None));
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, state);
        let entry = registry.get("log_event").unwrap();
        let payload = json!({ "event_type": "system", "producer": "test", "action": "start" });
        let a = (entry.handler)(payload.clone()).await.unwrap();
        let b = (entry.handler)(payload).await.unwrap();
        assert_ne!(a["event_id"], b["event_id"]);
    }
}
