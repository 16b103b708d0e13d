//! Alert registry (§4.9): CRUD plus JSON-file persistence. Corruption at
//! load yields an empty registry, never a crash (§6 "Persisted state").

use crate::config::CONFIG;
use shared_models::alert::Alert;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct AlertStore {
    alerts: Mutex<HashMap<String, Alert>>,
    path: String,
}

impl AlertStore {
    pub fn load() -> Self {
        let path = format!("{}/alerts.json", CONFIG.alert_store_dir);
        let alerts = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<HashMap<String, Alert>>(&raw).ok())
            .unwrap_or_default();
        Self { alerts: Mutex::new(alerts), path }
    }

    fn persist(&self, alerts: &HashMap<String, Alert>) {
        let Ok(_) = std::fs::create_dir_all(&CONFIG.alert_store_dir) else { return };
        if let Ok(json) = serde_json::to_string_pretty(alerts) {
            let _ = std::fs::write(&self.path, json);
        }
    }

    pub fn insert(&self, alert: Alert) {
        let mut alerts = self.alerts.lock().expect("alert store poisoned");
        alerts.insert(alert.alert_id.clone(), alert);
        self.persist(&alerts);
    }

    pub fn delete(&self, alert_id: &str) -> bool {
        let mut alerts = self.alerts.lock().expect("alert store poisoned");
        let removed = alerts.remove(alert_id).is_some();
        if removed {
            self.persist(&alerts);
        }
        removed
    }

    pub fn list(&self, user_id: Option<&str>, active_only: bool) -> Vec<Alert> {
        let alerts = self.alerts.lock().expect("alert store poisoned");
        alerts
            .values()
            .filter(|a| user_id.map(|u| a.owner.as_deref() == Some(u)).unwrap_or(true))
            .filter(|a| !active_only || !a.triggered)
            .cloned()
            .collect()
    }

    pub fn active_alerts(&self) -> Vec<Alert> {
        self.list(None, true)
    }

    /// Runs `f` over every alert whose symbol matches an entry in `quotes`,
    /// mutating in place, then persists once (§5 "Writes of the JSON file
    /// happen under the lock").
    pub fn apply_quotes(&self, quotes: &HashMap<String, f64>, mut f: impl FnMut(&mut Alert, f64) -> bool) -> Vec<Alert> {
        let mut alerts = self.alerts.lock().expect("alert store poisoned");
        let mut fired = Vec::new();
        for alert in alerts.values_mut() {
            if alert.triggered {
                continue;
            }
            if let Some(&price) = quotes.get(&alert.symbol) {
                if f(alert, price) {
                    fired.push(alert.clone());
                }
            }
        }
        self.persist(&alerts);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::alert::AlertCondition;

    #[test]
    fn insert_then_delete_restores_empty_list() {
        let store = AlertStore { alerts: Mutex::new(HashMap::new()), path: "/tmp/notif-test-alerts.json".to_string() };
        let alert = Alert::new("A1", "SYM", AlertCondition::Above, 100.0, None, None);
        store.insert(alert);
        assert_eq!(store.list(None, false).len(), 1);
        store.delete("A1");
        assert_eq!(store.list(None, false).len(), 0);
    }
}
