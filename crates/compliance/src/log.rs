//! Append-only audit event store (C8 / §4.8), single-writer behind one
//! mutex; readers take a snapshot clone (§5). `event_id` is a monotone
//! counter formatted `EVT_000001` (§9), strictly increasing per process
//! lifetime — audit events from the same producer are totally ordered.

use shared_models::audit::{format_event_id, AuditEvent, EventType};
use shared_models::severity::Severity;
use shared_models::time::now_iso;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct ComplianceLog {
    events: Mutex<Vec<AuditEvent>>,
    next_id: AtomicU64,
    /// Write-behind directory (§9 supplement: `COMPLIANCE_LOG_DIR`). `None`
    /// disables durability — persistence here is optional (§4.8).
    write_behind_dir: Option<String>,
}

impl ComplianceLog {
    pub fn new(write_behind_dir: Option<String>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            write_behind_dir,
        }
    }

    pub fn log_event(
        &self,
        event_type: EventType,
        producer: impl Into<String>,
        action: impl Into<String>,
        payload: std::collections::HashMap<String, serde_json::Value>,
        severity: Severity,
    ) -> AuditEvent {
        let counter = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = AuditEvent {
            event_id: format_event_id(counter),
            utc_timestamp: now_iso(),
            event_type,
            producer: producer.into(),
            action: action.into(),
            payload,
            severity,
        };

        {
            let mut events = self.events.lock().expect("compliance log poisoned");
            events.push(event.clone());
        }
        self.write_behind(&event);
        event
    }

    fn write_behind(&self, event: &AuditEvent) {
        let Some(dir) = &self.write_behind_dir else {
            return;
        };
        let _ = std::fs::create_dir_all(dir);
        let path = format!("{dir}/compliance_{}.jsonl", chrono::Utc::now().format("%Y%m%d"));
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            if let Ok(line) = serde_json::to_string(event) {
                let _ = writeln!(file, "{line}");
            }
        }
    }

    pub fn snapshot(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("compliance log poisoned").clone()
    }

    pub fn clear(&self) {
        self.events.lock().expect("compliance log poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn event_ids_are_monotone_and_distinct() {
        let log = ComplianceLog::new(None);
        let a = log.log_event(EventType::System, "test", "start", HashMap::new(), Severity::Info);
        let b = log.log_event(EventType::System, "test", "start", HashMap::new(), Severity::Info);
        assert_ne!(a.event_id, b.event_id);
        assert!(a.event_id < b.event_id);
    }

    #[test]
    fn clear_empties_the_log() {
        let log = ComplianceLog::new(None);
        log.log_event(EventType::System, "test", "start", HashMap::new(), Severity::Info);
        log.clear();
        assert!(log.snapshot().is_empty());
    }
}
