//! Bounded notification history ring (§4.9, §5 "Notification history: bounded
//! ring behind a mutex").

use crate::config::CONFIG;
use shared_models::notification::NotificationRecord;
use shared_models::severity::Severity;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;

const HISTORY_CAP: usize = 200;

pub struct NotificationHistory {
    records: Mutex<VecDeque<NotificationRecord>>,
}

impl NotificationHistory {
    pub fn new() -> Self {
        Self { records: Mutex::new(VecDeque::with_capacity(HISTORY_CAP)) }
    }

    pub fn record(&self, title: &str, body: &str, severity: Severity, channel: &str, delivered: bool) {
        let record = NotificationRecord {
            utc_timestamp: shared_models::time::now_iso(),
            title: title.to_string(),
            body: body.to_string(),
            severity,
            channel: channel.to_string(),
            delivered,
        };
        if channel == "file" {
            self.append_jsonl(&record);
        }
        let mut records = self.records.lock().expect("notification history poisoned");
        if records.len() == HISTORY_CAP {
            records.pop_front();
        }
        records.push_back(record);
    }

    fn append_jsonl(&self, record: &NotificationRecord) {
        let Ok(_) = std::fs::create_dir_all(&CONFIG.log_dir) else { return };
        let path = format!("{}/notifications_{}.jsonl", CONFIG.log_dir, chrono::Utc::now().format("%Y%m%d"));
        if let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(path) {
            if let Ok(line) = serde_json::to_string(record) {
                let _ = writeln!(file, "{line}");
            }
        }
    }

    pub fn recent(&self, limit: usize) -> Vec<NotificationRecord> {
        let records = self.records.lock().expect("notification history poisoned");
        records.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("notification history poisoned").len()
    }
}

impl Default for NotificationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_at_200_entries() {
        let history = NotificationHistory::new();
        for i in 0..250 {
            history.record(&format!("t{i}"), "m", Severity::Info, "webhook", true);
        }
        assert_eq!(history.len(), HISTORY_CAP);
    }

    #[test]
    fn recent_returns_newest_first() {
        let history = NotificationHistory::new();
        history.record("first", "m", Severity::Info, "webhook", true);
        history.record("second", "m", Severity::Info, "webhook", true);
        let recent = history.recent(10);
        assert_eq!(recent[0].title, "second");
    }
}
