//! Tool handlers for the notification gateway + alert monitor (C9 / §4.9).

use crate::alerts::AlertStore;
use crate::fanout;
use crate::history::NotificationHistory;
use crate::monitor::AlertMonitor;
use rpc_core::client::RpcClient;
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::alert::{Alert, AlertCondition};
use shared_models::severity::Severity;
use shared_models::time::now_iso;
use std::sync::Arc;
use std::time::Duration;

pub struct NotificationState {
    pub history: Arc<NotificationHistory>,
    pub alerts: Arc<AlertStore>,
    pub monitor: Arc<AlertMonitor>,
}

impl NotificationState {
    pub fn new() -> Self {
        let history = Arc::new(NotificationHistory::new());
        let alerts = Arc::new(AlertStore::load());
        let market = Arc::new(RpcClient::new(
            shared_models::ports::market_url(),
            "notification-monitor",
            Duration::from_secs(3),
        ));
        let monitor = Arc::new(AlertMonitor::new(alerts.clone(), history.clone(), market));
        Self { history, alerts, monitor }
    }
}

impl Default for NotificationState {
    fn default() -> Self {
        Self::new()
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::new(format!("{key} must be a string")))
}

fn severity_of(args: &Value) -> Severity {
    args.get("severity").and_then(Value::as_str).map(Severity::parse).unwrap_or(Severity::Info)
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<NotificationState>) {
    let s = state.clone();
    registry.register(
        "send_notification",
        "Send a message on a single named channel.",
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "channel": { "type": "string" },
                "severity": { "type": "string" },
                "title": { "type": "string" },
            },
            "required": ["message", "channel"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let message = str_arg(&args, "message")?;
                let channel = str_arg(&args, "channel")?;
                let title = args.get("title").and_then(Value::as_str).unwrap_or("Notification");
                let severity = severity_of(&args);
                Ok(fanout::send_one(&state.history, channel, title, message, severity).await)
            }
        },
    );

    let s = state.clone();
    registry.register(
        "send_alert",
        "Broadcast a message to every configured channel.",
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "message": { "type": "string" },
                "severity": { "type": "string" },
            },
            "required": ["title", "message"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let title = str_arg(&args, "title")?;
                let message = str_arg(&args, "message")?;
                let severity = severity_of(&args);
                Ok(fanout::send_alert(&state.history, title, message, severity).await)
            }
        },
    );

    let s = state.clone();
    registry.register(
        "send_multi_channel",
        "Broadcast a message to an explicit list of channels.",
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "channels": { "type": "array", "items": { "type": "string" } },
                "severity": { "type": "string" },
                "title": { "type": "string" },
                "email_to": { "type": "string" },
                "email_subject": { "type": "string" },
            },
            "required": ["message", "channels"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let message = str_arg(&args, "message")?;
                let channels_value = args
                    .get("channels")
                    .and_then(Value::as_array)
                    .ok_or_else(|| ToolError::new("channels must be an array"))?;
                let channels: Vec<&str> = channels_value.iter().filter_map(Value::as_str).collect();
                let severity = severity_of(&args);
                let title = args
                    .get("email_subject")
                    .and_then(Value::as_str)
                    .or_else(|| args.get("title").and_then(Value::as_str))
                    .unwrap_or("Notification");
                let email_to = args.get("email_to").and_then(Value::as_str);
                Ok(fanout::send_many(&state.history, &channels, title, message, severity, email_to).await)
            }
        },
    );

    let s = state.clone();
    registry.register(
        "get_notification_history",
        "Return the most recent notification records.",
        json!({
            "type": "object",
            "properties": { "limit": { "type": "integer" } },
        }),
        move |args| {
            let state = s.clone();
            async move {
                let limit = args.get("limit").and_then(Value::as_u64).unwrap_or(20) as usize;
                Ok(json!({ "records": state.history.recent(limit), "total": state.history.len() }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "get_notification_status",
        "Return channel availability and history size.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move {
                Ok(json!({
                    "available_channels": crate::config::CONFIG.available_channels(),
                    "history_size": state.history.len(),
                    "timestamp": now_iso(),
                }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "create_price_alert",
        "Create a price alert; ensures the monitor is running.",
        json!({
            "type": "object",
            "properties": {
                "symbol": { "type": "string" },
                "condition": { "type": "string" },
                "threshold": { "type": "number" },
                "user_id": { "type": "string" },
            },
            "required": ["symbol", "condition", "threshold"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let symbol = str_arg(&args, "symbol")?;
                let condition_str = str_arg(&args, "condition")?;
                let threshold = args
                    .get("threshold")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ToolError::new("threshold must be a number"))?;
                let user_id = args.get("user_id").and_then(Value::as_str).map(str::to_string);
                let Some(condition) = AlertCondition::parse(condition_str) else {
                    return Ok(json!({ "error": format!("unknown condition: {condition_str}") }));
                };

                let alert_id = format!("ALT-{}", shared_models::hex_token(8));
                let alert = Alert::new(alert_id.clone(), symbol, condition, threshold, None, user_id);
                state.alerts.insert(alert);
                let monitor_status = state.monitor.start(None);

                Ok(json!({
                    "alert_id": alert_id,
                    "monitor_status": monitor_status,
                    "timestamp": now_iso(),
                }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "list_price_alerts",
        "List alerts, optionally filtered to a user and/or active-only.",
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string" },
                "active_only": { "type": "boolean" },
            },
        }),
        move |args| {
            let state = s.clone();
            async move {
                let user_id = args.get("user_id").and_then(Value::as_str);
                let active_only = args.get("active_only").and_then(Value::as_bool).unwrap_or(false);
                Ok(json!({ "alerts": state.alerts.list(user_id, active_only) }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "delete_price_alert",
        "Delete an alert by id.",
        json!({
            "type": "object",
            "properties": { "alert_id": { "type": "string" } },
            "required": ["alert_id"],
        }),
        move |args| {
            let state = s.clone();
            async move {
                let alert_id = str_arg(&args, "alert_id")?;
                let deleted = state.alerts.delete(alert_id);
                Ok(json!({ "deleted": deleted, "alert_id": alert_id }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "check_alerts_now",
        "Perform a single synchronous alert scan, independent of the monitor loop's cadence.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move {
                match state.monitor.tick().await {
                    Ok(fired) => Ok(json!({ "success": true, "fired": fired, "timestamp": now_iso() })),
                    Err(e) => Ok(json!({ "success": false, "reason": e, "timestamp": now_iso() })),
                }
            }
        },
    );

    let s = state.clone();
    registry.register(
        "start_monitor",
        "Start the alert monitor loop (idempotent).",
        json!({
            "type": "object",
            "properties": { "interval": { "type": "integer" } },
        }),
        move |args| {
            let state = s.clone();
            async move {
                let interval = args.get("interval").and_then(Value::as_u64);
                let status = state.monitor.start(interval);
                Ok(json!({ "status": status, "interval": state.monitor.interval() }))
            }
        },
    );

    let s = state.clone();
    registry.register(
        "stop_monitor",
        "Stop the alert monitor loop.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move { Ok(json!({ "status": state.monitor.stop() })) }
        },
    );

    let s = state;
    registry.register(
        "get_monitor_status",
        "Return the monitor's running state, interval, and recent tick log.",
        json!({ "type": "object", "properties": {} }),
        move |_args| {
            let state = s.clone();
            async move {
                Ok(json!({
                    "running": state.monitor.is_running(),
                    "interval": state.monitor.interval(),
                    "log": state.monitor.recent_log(),
                }))
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (ToolRegistry, Arc<NotificationState>) {
        let state = Arc::new(NotificationState::new());
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, state.clone());
        (registry, state)
    }

    #[tokio::test]
    async fn create_then_delete_alert_restores_empty_list() {
        let (registry, _state) = registry();
        let create = registry.get("create_price_alert").unwrap();
        let created = (create.handler)(json!({
            "symbol": "X",
            "condition": "crosses_above",
            "threshold": 100.0,
        }))
        .await
        .unwrap();
        let alert_id = created["alert_id"].as_str().unwrap().to_string();

        let list = registry.get("list_price_alerts").unwrap();
        let before_delete = (list.handler)(json!({})).await.unwrap();
        assert_eq!(before_delete["alerts"].as_array().unwrap().len(), 1);

        let delete = registry.get("delete_price_alert").unwrap();
        (delete.handler)(json!({ "alert_id": alert_id })).await.unwrap();

        let after_delete = (list.handler)(json!({})).await.unwrap();
        assert_eq!(after_delete["alerts"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn stop_monitor_without_start_reports_not_running() {
        let (registry, _state) = registry();
        let stop = registry.get("stop_monitor").unwrap();
        let result = (stop.handler)(json!({})).await.unwrap();
        assert_eq!(result["status"], "not running");
    }

    #[tokio::test]
    async fn send_alert_reports_attempt_counts() {
        let (registry, _state) = registry();
        let entry = registry.get("send_alert").unwrap();
        let result = (entry.handler)(json!({ "title": "t", "message": "m" })).await.unwrap();
        assert!(result["channels_attempted"].as_u64().unwrap() >= 1);
    }
}
