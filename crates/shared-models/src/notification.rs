//! Notification records kept by the gateway's in-memory ring (C9).

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub utc_timestamp: String,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub channel: String,
    pub delivered: bool,
}
