//! Simulation / back-testing engine (C10 / §4.10). Stateless: every tool is
//! a pure function of its arguments plus the deterministic synthetic price
//! series in [`series`].

pub mod series;
pub mod strategies;
pub mod tools;

use rpc_core::registry::ToolRegistry;
use rpc_core::server::{build_router, ServiceState};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::register_tools;
use tracing::info;

pub const SERVICE_NAME: &str = "simulation";
pub const SERVICE_VERSION: &str = "1.0.0";

pub async fn run(port: u16) -> anyhow::Result<()> {
    let mut tools = ToolRegistry::new();
    register_tools(&mut tools);

    let service_state = Arc::new(ServiceState::new(SERVICE_NAME, SERVICE_VERSION, tools));
    let router = build_router(service_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(service = SERVICE_NAME, %addr, "starting service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
