//! Hard-coded peer port map (§6, §9 "Peer discovery"): no dynamic service
//! discovery is required for the core. Overridable per-service via a
//! `<SERVICE>_URL` environment variable (e.g. `MARKET_URL=http://host:9001`)
//! so the process supervisor (C11) can run services across hosts without
//! code changes.

pub const MARKET_PORT: u16 = 9001;
pub const RISK_PORT: u16 = 9002;
pub const EXECUTION_PORT: u16 = 9003;
pub const COMPLIANCE_PORT: u16 = 9004;
pub const TECHNICAL_PORT: u16 = 9005;
pub const FUNDAMENTAL_PORT: u16 = 9006;
pub const MACRO_PORT: u16 = 9007;
pub const NEWS_PORT: u16 = 9008;
pub const PORTFOLIO_ANALYTICS_PORT: u16 = 9009;
pub const VOLATILITY_PORT: u16 = 9010;
pub const ALERT_ENGINE_PORT: u16 = 9011;
pub const SIMULATION_PORT: u16 = 9012;
pub const NOTIFICATION_PORT: u16 = 9013;
/// Not part of §6's port table (only the 13 analytical/core
/// services are listed there); the two C7 orchestration pipelines still
/// need a port to be independently runnable, since every service crate
/// exposes a `run(port)`, so they're assigned the next two in sequence
/// (see DESIGN.md).
pub const TRADER_SUPERVISOR_PORT: u16 = 9014;
pub const INVESTOR_SUPERVISOR_PORT: u16 = 9015;

/// Resolves the base URL for a peer service: `<SERVICE>_URL` env var if
/// set, otherwise `http://localhost:<default-port>`.
pub fn peer_url(env_key: &str, default_port: u16) -> String {
    std::env::var(env_key).unwrap_or_else(|_| format!("http://localhost:{default_port}"))
}

pub fn market_url() -> String {
    peer_url("MARKET_URL", MARKET_PORT)
}

pub fn risk_url() -> String {
    peer_url("RISK_URL", RISK_PORT)
}

pub fn execution_url() -> String {
    peer_url("EXECUTION_URL", EXECUTION_PORT)
}

pub fn compliance_url() -> String {
    peer_url("COMPLIANCE_URL", COMPLIANCE_PORT)
}

pub fn technical_url() -> String {
    peer_url("TECHNICAL_URL", TECHNICAL_PORT)
}

pub fn fundamental_url() -> String {
    peer_url("FUNDAMENTAL_URL", FUNDAMENTAL_PORT)
}

pub fn macro_url() -> String {
    peer_url("MACRO_URL", MACRO_PORT)
}

pub fn news_url() -> String {
    peer_url("NEWS_URL", NEWS_PORT)
}

pub fn portfolio_analytics_url() -> String {
    peer_url("PORTFOLIO_ANALYTICS_URL", PORTFOLIO_ANALYTICS_PORT)
}

pub fn volatility_url() -> String {
    peer_url("VOLATILITY_URL", VOLATILITY_PORT)
}

pub fn alert_engine_url() -> String {
    peer_url("ALERT_ENGINE_URL", ALERT_ENGINE_PORT)
}

pub fn simulation_url() -> String {
    peer_url("SIMULATION_URL", SIMULATION_PORT)
}

pub fn notification_url() -> String {
    peer_url("NOTIFICATION_URL", NOTIFICATION_PORT)
}

pub fn trader_supervisor_url() -> String {
    peer_url("TRADER_SUPERVISOR_URL", TRADER_SUPERVISOR_PORT)
}

pub fn investor_supervisor_url() -> String {
    peer_url("INVESTOR_SUPERVISOR_URL", INVESTOR_SUPERVISOR_PORT)
}

/// (service_name, default_port) for every core service, in port order.
/// Used by the process supervisor (C11) CLI and by `--help`/error listing.
pub const SERVICE_NAMES: &[(&str, u16)] = &[
    ("market", MARKET_PORT),
    ("risk", RISK_PORT),
    ("execution", EXECUTION_PORT),
    ("compliance", COMPLIANCE_PORT),
    ("technical", TECHNICAL_PORT),
    ("fundamental", FUNDAMENTAL_PORT),
    ("macro", MACRO_PORT),
    ("news", NEWS_PORT),
    ("portfolio-analytics", PORTFOLIO_ANALYTICS_PORT),
    ("volatility", VOLATILITY_PORT),
    ("alert-engine", ALERT_ENGINE_PORT),
    ("simulation", SIMULATION_PORT),
    ("notification", NOTIFICATION_PORT),
    ("trader-supervisor", TRADER_SUPERVISOR_PORT),
    ("investor-supervisor", INVESTOR_SUPERVISOR_PORT),
];
