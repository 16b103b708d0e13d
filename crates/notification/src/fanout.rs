//! Multi-channel broadcast logic shared by the `send_alert`/`send_multi_channel`
//! tools and the alert monitor's trigger path (§4.9).

use crate::channels;
use crate::config::CONFIG;
use crate::history::NotificationHistory;
use serde_json::{json, Value};
use shared_models::severity::Severity;

async fn deliver_one(channel: &str, title: &str, message: &str, severity: &str, email_to: Option<&str>) -> Result<(), String> {
    match channel {
        "file" => channels::send_file(title, message, severity).await,
        "discord" => channels::send_discord(title, message, severity).await,
        "slack" => channels::send_slack(title, message, severity).await,
        "webhook" => channels::send_webhook(title, message, severity).await,
        "email" => channels::send_email(title, message, email_to).await,
        other => Err(format!("unknown channel: {other}")),
    }
}

/// Sends to exactly one channel, recording the attempt in `history`.
pub async fn send_one(history: &NotificationHistory, channel: &str, title: &str, message: &str, severity: Severity) -> Value {
    let result = deliver_one(channel, title, message, severity.as_str(), None).await;
    let delivered = result.is_ok();
    history.record(title, message, severity, channel, delivered);
    match result {
        Ok(()) => json!({ "channel": channel, "success": true }),
        Err(reason) => json!({ "channel": channel, "success": false, "reason": reason }),
    }
}

/// Broadcasts to every channel in `channels`, recording each attempt. A
/// channel failure never prevents attempting the others (§4.9).
pub async fn send_many(
    history: &NotificationHistory,
    channels: &[&str],
    title: &str,
    message: &str,
    severity: Severity,
    email_to: Option<&str>,
) -> Value {
    let mut results = serde_json::Map::new();
    let mut delivered = 0u32;
    for &channel in channels {
        let result = deliver_one(channel, title, message, severity.as_str(), email_to).await;
        let ok = result.is_ok();
        if ok {
            delivered += 1;
        }
        history.record(title, message, severity, channel, ok);
        results.insert(
            channel.to_string(),
            match result {
                Ok(()) => json!({ "success": true }),
                Err(reason) => json!({ "success": false, "reason": reason }),
            },
        );
    }
    json!({
        "channels_attempted": channels.len(),
        "channels_delivered": delivered,
        "results": Value::Object(results),
        "timestamp": shared_models::time::now_iso(),
    })
}

/// Broadcasts to every channel configured in this process (§4.9 `send_alert`).
pub async fn send_alert(history: &NotificationHistory, title: &str, message: &str, severity: Severity) -> Value {
    let channels = CONFIG.available_channels();
    send_many(history, &channels, title, message, severity, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_channels_report_failure_without_panicking() {
        let history = NotificationHistory::new();
        let result = send_many(&history, &["discord", "slack"], "t", "m", Severity::Warning, None).await;
        assert_eq!(result["channels_delivered"], 0);
        assert_eq!(result["channels_attempted"], 2);
    }
}
