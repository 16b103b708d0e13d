//! Volatility regime service (C3 / §4.3): wraps C2's realized volatility
//! with a regime classifier.

pub mod regime;
pub mod tools;

use rpc_core::registry::ToolRegistry;
use rpc_core::server::{build_router, ServiceState};
use shared_models::ports::market_url;
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{register_tools, VolatilityState};
use tracing::info;

pub const SERVICE_NAME: &str = "volatility";
pub const SERVICE_VERSION: &str = "1.0.0";

pub async fn run(port: u16) -> anyhow::Result<()> {
    let state = Arc::new(VolatilityState::new(market_url()));

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
