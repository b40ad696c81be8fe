//! Gateway binary

use anyhow::Result;
use bookstore::common::{Config, GatewayConfig};
use bookstore::Gateway;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookstore-gateway")]
#[command(about = "Bookstore HTTP gateway - dispatches to the Add/Check gRPC backends")]
struct Args {
    /// Bind address for the HTTP API
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Add backend endpoint
    #[arg(long)]
    add_backend: Option<String>,

    /// Check backend endpoint
    #[arg(long)]
    check_backend: Option<String>,

    /// Per-request RPC deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // File config provides the base; CLI flags win where given.
    let file = Config::load().gateway.unwrap_or_default();
    let config = GatewayConfig {
        bind_addr: args.bind.unwrap_or(file.bind_addr),
        add_backend: args.add_backend.unwrap_or(file.add_backend),
        check_backend: args.check_backend.unwrap_or(file.check_backend),
        request_timeout_ms: args.timeout_ms.unwrap_or(file.request_timeout_ms),
    };

    Gateway::new(config).serve().await?;
    Ok(())
}
