//! Per-channel delivery (§4.9). Each function is self-contained and never
//! panics: a delivery failure comes back as `Err(reason)` so the caller can
//! keep fanning out to the other channels (§4.9 "a channel failure MUST NOT
//! prevent attempting the others").

use crate::config::CONFIG;
use serde_json::json;
use std::io::Write;

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub async fn send_file(title: &str, message: &str, severity: &str) -> Result<(), String> {
    std::fs::create_dir_all(&CONFIG.log_dir).map_err(|e| format!("cannot create log dir: {e}"))?;
    let path = format!("{}/alerts_{}.log", CONFIG.log_dir, chrono::Utc::now().format("%Y%m%d"));
    let line = format!("[{}] [{}] {}: {}\n", shared_models::time::now_iso(), severity.to_uppercase(), title, message);
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("cannot open {path}: {e}"))?;
    file.write_all(line.as_bytes()).map_err(|e| format!("write failed: {e}"))
}

pub async fn send_discord(title: &str, message: &str, severity: &str) -> Result<(), String> {
    let url = CONFIG.discord_webhook_url.as_ref().ok_or("discord channel not configured")?;
    let color = match severity {
        "critical" => 0xFF0000,
        "warning" => 0xFFA500,
        _ => 0x0099FF,
    };
    let payload = json!({
        "embeds": [{
            "title": title,
            "description": message,
            "color": color,
            "timestamp": shared_models::time::now_iso(),
        }]
    });
    let response = http_client().post(url).json(&payload).send().await.map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("discord webhook returned {}", response.status()))
    }
}

pub async fn send_slack(title: &str, message: &str, _severity: &str) -> Result<(), String> {
    let text = format!("*{title}*\n{message}");
    if let Some(webhook) = &CONFIG.slack_webhook_url {
        let response = http_client()
            .post(webhook)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        return if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("slack webhook returned {}", response.status()))
        };
    }
    let (Some(token), Some(channel)) = (&CONFIG.slack_bot_token, &CONFIG.slack_channel) else {
        return Err("slack channel not configured".to_string());
    };
    let response = http_client()
        .post("https://slack.com/api/chat.postMessage")
        .bearer_auth(token)
        .json(&json!({ "channel": channel, "text": text }))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let body: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;
    if body.get("ok").and_then(serde_json::Value::as_bool).unwrap_or(false) {
        Ok(())
    } else {
        Err(format!(
            "slack API error: {}",
            body.get("error").and_then(serde_json::Value::as_str).unwrap_or("unknown")
        ))
    }
}

pub async fn send_webhook(title: &str, message: &str, severity: &str) -> Result<(), String> {
    let url = CONFIG.webhook_url.as_ref().ok_or("webhook channel not configured")?;
    let payload = json!({
        "title": title,
        "message": message,
        "severity": severity,
        "timestamp": shared_models::time::now_iso(),
    });
    let response = http_client().post(url).json(&payload).send().await.map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("webhook returned {}", response.status()))
    }
}

pub async fn send_email(title: &str, message: &str, to: Option<&str>) -> Result<(), String> {
    use lettre::message::Mailbox;
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

    if !CONFIG.email_enabled() {
        return Err("email channel not configured".to_string());
    }
    let host = CONFIG.smtp_host.as_ref().unwrap();
    let port = CONFIG.smtp_port.unwrap_or(587);
    let from = CONFIG.smtp_from.as_ref().unwrap();
    let recipient = to.unwrap_or(from);

    let from_box: Mailbox = from.parse().map_err(|e| format!("invalid SMTP_FROM: {e}"))?;
    let to_box: Mailbox = recipient.parse().map_err(|e| format!("invalid recipient: {e}"))?;

    let email = Message::builder()
        .from(from_box)
        .to(to_box)
        .subject(title)
        .body(message.to_string())
        .map_err(|e| format!("cannot build email: {e}"))?;

    let creds = Credentials::new(CONFIG.smtp_user.clone().unwrap(), CONFIG.smtp_password.clone().unwrap());
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        .map_err(|e| format!("cannot reach {host}: {e}"))?
        .port(port)
        .credentials(creds)
        .build();

    mailer.send(email).await.map(|_| ()).map_err(|e| format!("SMTP send failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discord_without_config_is_rejected() {
        let result = send_discord("t", "m", "info").await;
        assert!(result.is_err());
    }
}
