//! Channel configuration (§6): presence of an env var enables the channel.
//! Loaded once into a `lazy_static` the way a long-running service loads its
//! global `CONFIG` — unlike that pattern, every field here is optional: an
//! absent channel is disabled, not a startup failure (§6 "services MUST NOT
//! abort startup").

use lazy_static::lazy_static;
use std::env;

pub struct NotificationConfig {
    pub discord_webhook_url: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_channel: Option<String>,
    pub webhook_url: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    /// Directory for the dated `file` channel log (§6); defaults to `./notification_logs`.
    pub log_dir: String,
    /// Directory for the alert registry's persisted JSON file (§6); defaults to `./notification_logs`.
    pub alert_store_dir: String,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl NotificationConfig {
    fn load() -> Self {
        Self {
            discord_webhook_url: non_empty("DISCORD_WEBHOOK_URL"),
            slack_webhook_url: non_empty("SLACK_WEBHOOK_URL"),
            slack_bot_token: non_empty("SLACK_BOT_TOKEN"),
            slack_channel: non_empty("SLACK_CHANNEL"),
            webhook_url: non_empty("NOTIFICATION_WEBHOOK_URL"),
            smtp_host: non_empty("SMTP_HOST"),
            smtp_port: non_empty("SMTP_PORT").and_then(|v| v.parse().ok()),
            smtp_user: non_empty("SMTP_USER"),
            smtp_password: non_empty("SMTP_PASSWORD"),
            smtp_from: non_empty("SMTP_FROM"),
            log_dir: env::var("NOTIFICATION_LOG_DIR").unwrap_or_else(|_| "notification_logs".to_string()),
            alert_store_dir: env::var("ALERT_STORE_DIR").unwrap_or_else(|_| "notification_logs".to_string()),
        }
    }

    pub fn slack_enabled(&self) -> bool {
        self.slack_webhook_url.is_some() || (self.slack_bot_token.is_some() && self.slack_channel.is_some())
    }

    pub fn email_enabled(&self) -> bool {
        self.smtp_host.is_some() && self.smtp_user.is_some() && self.smtp_password.is_some() && self.smtp_from.is_some()
    }

    /// Channels available in this process, in the canonical order used by `send_alert`.
    pub fn available_channels(&self) -> Vec<&'static str> {
        let mut channels = vec!["file"];
        if self.discord_webhook_url.is_some() {
            channels.push("discord");
        }
        if self.slack_enabled() {
            channels.push("slack");
        }
        if self.webhook_url.is_some() {
            channels.push("webhook");
        }
        if self.email_enabled() {
            channels.push("email");
        }
        channels
    }
}

lazy_static! {
    pub static ref CONFIG: NotificationConfig = NotificationConfig::load();
}
