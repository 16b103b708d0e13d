//! Session registry (§4.1, §5): a synchronized map keyed by session_id,
//! minted on `initialize` and required on every subsequent call.

use shared_models::session::{ClientInfo, Session};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct Entry {
    session: Session,
    last_touch_monotonic: Instant,
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    /// `idle_timeout` floors at 10 minutes per §4.1 ("not less than 10
    /// minutes").
    pub fn new(idle_timeout: Duration) -> Self {
        let floor = Duration::from_secs(600);
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout: idle_timeout.max(floor),
        }
    }

    pub fn mint(&self, client_info: ClientInfo, protocol_version: String) -> String {
        let session_id = Uuid::new_v4().to_string();
        let now_iso = shared_models::time::now_iso();
        let session = Session {
            session_id: session_id.clone(),
            client_info,
            protocol_version,
            creation_time: now_iso.clone(),
            last_touched: now_iso,
        };
        let mut sessions = self.sessions.lock().expect("session registry poisoned");
        sessions.insert(
            session_id.clone(),
            Entry {
                session,
                last_touch_monotonic: Instant::now(),
            },
        );
        session_id
    }

    /// Returns true iff `session_id` is known and not idle-expired; touches
    /// it (refreshes its idle clock) as a side effect when valid.
    pub fn touch(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.lock().expect("session registry poisoned");
        match sessions.get_mut(session_id) {
            Some(entry) if entry.last_touch_monotonic.elapsed() <= self.idle_timeout => {
                entry.last_touch_monotonic = Instant::now();
                entry.session.last_touched = shared_models::time::now_iso();
                true
            }
            Some(_) => {
                sessions.remove(session_id);
                false
            }
            None => false,
        }
    }

    pub fn reap_idle(&self) {
        let mut sessions = self.sessions.lock().expect("session registry poisoned");
        sessions.retain(|_, entry| entry.last_touch_monotonic.elapsed() <= self.idle_timeout);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session registry poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClientInfo {
        ClientInfo {
            name: "test".into(),
            version: "1.0".into(),
        }
    }

    #[test]
    fn unknown_session_fails_touch() {
        let reg = SessionRegistry::new(Duration::from_secs(600));
        assert!(!reg.touch("bogus"));
    }

    #[test]
    fn minted_session_touches_successfully() {
        let reg = SessionRegistry::new(Duration::from_secs(600));
        let id = reg.mint(client(), "2024-11-05".into());
        assert!(reg.touch(&id));
    }
}
