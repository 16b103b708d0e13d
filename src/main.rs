//! Process supervisor (C11 / §4, §6): launches exactly one service per
//! process, selected by a single CLI argument. There is no in-process
//! fan-out across services — the RPC protocol is the only inter-service
//! edge (§9 "strict layering").

use clap::Parser;
use shared_models::ports::SERVICE_NAMES;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Launch a single service of the AutoFinance control plane.
#[derive(Parser, Debug)]
#[command(name = "autofinance", version, about)]
struct Cli {
    /// Which service to launch in this process.
    service: String,

    /// Override the service's default listen port.
    #[arg(long)]
    port: Option<u16>,
}

fn default_port(service: &str) -> Option<u16> {
    SERVICE_NAMES
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, port)| *port)
}

fn usage_error(service: &str) -> ! {
    let valid: Vec<&str> = SERVICE_NAMES.iter().map(|(name, _)| *name).collect();
    eprintln!("unknown service: {service}");
    eprintln!("valid services: {}", valid.join(", "));
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let Some(default) = default_port(&cli.service) else {
        usage_error(&cli.service);
    };
    let port = cli.port.unwrap_or(default);

    tracing::info!(service = %cli.service, port, "process supervisor launching service");

    match cli.service.as_str() {
        "market" => market::run(port).await,
        "risk" => risk::run(port).await,
        "execution" => execution::run(port).await,
        "compliance" => compliance::run(port).await,
        "technical" => technical::run(port).await,
        "fundamental" => fundamental::run(port).await,
        "macro" => macro_analyzer::run(port).await,
        "news" => news::run(port).await,
        "portfolio-analytics" => portfolio_analytics::run(port).await,
        "volatility" => volatility::run(port).await,
        "alert-engine" => notification::run(port).await,
        "simulation" => simulation::run(port).await,
        "notification" => notification::run(port).await,
        "trader-supervisor" => trader_supervisor::run(port).await,
        "investor-supervisor" => investor_supervisor::run(port).await,
        other => usage_error(other),
    }
}
