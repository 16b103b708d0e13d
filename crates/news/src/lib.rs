//! News sentiment service (C3 / §4.3): headline retrieval plus sentiment
//! scoring via an LLM delegate when configured, falling back to a
//! deterministic keyword bag.

pub mod headlines;
pub mod provider;
pub mod sentiment;
pub mod tools;

use headlines::SyntheticHeadlineSource;
use provider::LlmSentimentProvider;
use rpc_core::registry::ToolRegistry;
use rpc_core::server::{build_router, ServiceState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tools::{register_tools, NewsState};
use tracing::info;

pub const SERVICE_NAME: &str = "news";
pub const SERVICE_VERSION: &str = "1.0.0";

pub async fn run(port: u16) -> anyhow::Result<()> {
    let preferred = LlmSentimentProvider::from_env(Duration::from_secs(60))
        .map(|p| Arc::new(p) as Arc<dyn provider::SentimentProvider>);
    if preferred.is_none() {
        info!(service = SERVICE_NAME, "OPENAI_API_KEY not set, using keyword-bag sentiment only");
    }

    let state = Arc::new(NewsState::new(Arc::new(SyntheticHeadlineSource::new()), preferred));

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
