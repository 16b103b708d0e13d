//! Market service (C2): quotes, candles, and realized volatility behind
//! the shared RPC substrate (§4.2).

pub mod cache;
pub mod provider;
pub mod symbol;
pub mod tools;

use provider::SyntheticQuoteSource;
use rpc_core::registry::ToolRegistry;
use rpc_core::server::{build_router, ServiceState};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{register_tools, MarketState};
use tracing::info;

pub const SERVICE_NAME: &str = "market";
pub const SERVICE_VERSION: &str = "1.0.0";

pub async fn run(port: u16) -> anyhow::Result<()> {
    let market_state = Arc::new(MarketState::new(Arc::new(SyntheticQuoteSource::new())));

    let mut tools = ToolRegistry::new();
    register_tools(&mut tools, market_state);

    let state = Arc::new(ServiceState::new(SERVICE_NAME, SERVICE_VERSION, tools));
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(service = SERVICE_NAME, %addr, "starting service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
