//! Portfolio engine (C5 / §4.5): sole mutator of `Portfolio` state.

pub mod store;
pub mod tools;

use rpc_core::registry::ToolRegistry;
use rpc_core::server::{build_router, ServiceState};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{register_tools, ExecutionState};
use tracing::info;

pub const SERVICE_NAME: &str = "execution";
pub const SERVICE_VERSION: &str = "1.0.0";

/// Starting cash for a freshly booted portfolio (demo default; reset via
/// `reset_portfolio` to any other value at runtime).
pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

pub async fn run(port: u16) -> anyhow::Result<()> {
    let state = Arc::new(ExecutionState::new(DEFAULT_INITIAL_CASH));

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
