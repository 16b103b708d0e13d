//! Compliance log (C8 / §4.8): a single append-only audit event store with
//! query tools. No other crate may append to or clear this log except
//! through its RPC surface.

pub mod log;
pub mod tools;

use log::ComplianceLog;
use rpc_core::registry::ToolRegistry;
use rpc_core::server::{build_router, ServiceState};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::register_tools;
use tracing::info;

pub const SERVICE_NAME: &str = "compliance";
pub const SERVICE_VERSION: &str = "1.0.0";

pub async fn run(port: u16) -> anyhow::Result<()> {
    let write_behind_dir = std::env::var("COMPLIANCE_LOG_DIR").ok().filter(|d| !d.is_empty());
    let state = Arc::new(ComplianceLog::new(write_behind_dir));

    let mut tools = ToolRegistry::new();
    register_tools(&mut tools, state);

    let service_state = Arc::new(ServiceState::new(SERVICE_NAME, SERVICE_VERSION, tools));
    let router = build_router(service_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(service = SERVICE_NAME, %addr, "starting service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
