//! Self-driving price-alert scheduler (§4.9). A single long-running loop
//! per process; lifecycle is idempotent (`start_monitor` twice returns
//! "already running") and cancellation is cooperative via an `AtomicBool`
//! polled between ticks (§5 "Cancellation").

use crate::alerts::AlertStore;
use crate::history::NotificationHistory;
use rpc_core::client::RpcClient;
use serde_json::{json, Value};
use shared_models::alert::Alert;
use shared_models::severity::Severity;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, warn};

pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const MIN_INTERVAL_SECS: u64 = 10;
const MONITOR_LOG_CAP: usize = 50;

pub struct AlertMonitor {
    alerts: Arc<AlertStore>,
    history: Arc<NotificationHistory>,
    market: Arc<RpcClient>,
    running: AtomicBool,
    interval_secs: AtomicU64,
    log: Mutex<VecDeque<Value>>,
}

impl AlertMonitor {
    pub fn new(alerts: Arc<AlertStore>, history: Arc<NotificationHistory>, market: Arc<RpcClient>) -> Self {
        Self {
            alerts,
            history,
            market,
            running: AtomicBool::new(false),
            interval_secs: AtomicU64::new(DEFAULT_INTERVAL_SECS),
            log: Mutex::new(VecDeque::with_capacity(MONITOR_LOG_CAP)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn interval(&self) -> u64 {
        self.interval_secs.load(Ordering::SeqCst)
    }

    fn push_log(&self, event: Value) {
        let mut log = self.log.lock().expect("monitor log poisoned");
        if log.len() == MONITOR_LOG_CAP {
            log.pop_front();
        }
        log.push_back(event);
    }

    pub fn recent_log(&self) -> Vec<Value> {
        self.log.lock().expect("monitor log poisoned").iter().cloned().collect()
    }

    /// Starts the loop if not already running. Idempotent (§4.9).
    pub fn start(self: &Arc<Self>, interval_secs: Option<u64>) -> &'static str {
        if self.running.swap(true, Ordering::SeqCst) {
            return "already running";
        }
        let interval = interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS).max(MIN_INTERVAL_SECS);
        self.interval_secs.store(interval, Ordering::SeqCst);

        let monitor = self.clone();
        tokio::spawn(async move {
            loop {
                if !monitor.running.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(e) = monitor.tick().await {
                    error!(error = %e, "alert monitor tick failed");
                    monitor.push_log(json!({
                        "event": "error",
                        "timestamp": shared_models::time::now_iso(),
                        "detail": e,
                    }));
                }
                tokio::time::sleep(Duration::from_secs(monitor.interval())).await;
            }
        });
        "started"
    }

    pub fn stop(&self) -> &'static str {
        if self.running.swap(false, Ordering::SeqCst) {
            "stopped"
        } else {
            "not running"
        }
    }

    /// Single synchronous scan (§4.9 steps 1-6), also used directly by
    /// `check_alerts_now` outside the loop's cadence.
    pub async fn tick(&self) -> Result<usize, String> {
        let active = self.alerts.active_alerts();
        if active.is_empty() {
            self.push_log(json!({ "event": "check", "timestamp": shared_models::time::now_iso(), "active": 0 }));
            return Ok(0);
        }

        let mut symbols: Vec<&str> = active.iter().map(|a| a.symbol.as_str()).collect();
        symbols.sort();
        symbols.dedup();

        let mut quotes: HashMap<String, f64> = HashMap::new();
        for symbol in symbols {
            match self.market.call_tool("get_live_price", json!({ "symbol": symbol })).await {
                Ok(result) => {
                    if let Some(price) = result.get("price").and_then(Value::as_f64) {
                        quotes.insert(symbol.to_string(), price);
                    } else {
                        warn!(symbol, "quote fetch returned no price");
                    }
                }
                Err(e) => warn!(symbol, error = %e, "quote fetch failed"),
            }
        }

        let mut fired_count = 0;
        let fired = self.alerts.apply_quotes(&quotes, |alert: &mut Alert, price| {
            let last_price = alert.last_price;
            let fires = alert.condition.fires(price, alert.threshold, last_price);
            if fires {
                alert.triggered = true;
                alert.triggered_at = Some(shared_models::time::now_iso());
                alert.triggered_price = Some(price);
                alert.trigger_count += 1;
            }
            alert.last_price = Some(price);
            alert.last_checked = Some(shared_models::time::now_iso());
            fires
        });

        for alert in &fired {
            fired_count += 1;
            let title = format!("Price alert: {}", alert.symbol);
            let message = format!(
                "{} {:?} {} (now {})",
                alert.symbol,
                alert.condition,
                alert.threshold,
                alert.triggered_price.unwrap_or_default()
            );
            let _ = crate::fanout::send_alert(&self.history, &title, &message, Severity::Critical).await;
            self.push_log(json!({
                "event": "triggered",
                "timestamp": shared_models::time::now_iso(),
                "alert_id": alert.alert_id,
                "symbol": alert.symbol,
            }));
        }

        self.push_log(json!({
            "event": "check",
            "timestamp": shared_models::time::now_iso(),
            "active": quotes.len(),
            "fired": fired_count,
        }));
        Ok(fired_count)
    }
}
