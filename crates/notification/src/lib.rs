//! Notification gateway + alert monitor (C9 / §4.9): simultaneously a
//! notification fan-out, an alert registry, and a scheduler. The most
//! intricate component in the federation.

pub mod alerts;
pub mod channels;
pub mod config;
pub mod fanout;
pub mod history;
pub mod monitor;
pub mod tools;

use rpc_core::registry::ToolRegistry;
use rpc_core::server::{build_router, ServiceState};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{register_tools, NotificationState};
use tracing::info;

pub const SERVICE_NAME: &str = "notification";
pub const SERVICE_VERSION: &str = "1.0.0";

pub async fn run(port: u16) -> anyhow::Result<()> {
    let state = Arc::new(NotificationState::new());
    // §4.9 lifecycle: "created lazily ... or by server start".
    state.monitor.start(None);

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
