//! Check backend binary

use anyhow::Result;
use bookstore::common::Config;
use bookstore::model::MemBookStore;
use bookstore::rpc;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookstore-check")]
#[command(about = "Bookstore Check backend - read-only price lookups over gRPC")]
struct Args {
    /// Bind address for the gRPC server
    #[arg(long)]
    bind: Option<SocketAddr>,

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

    let bind_addr = args
        .bind
        .or_else(|| Config::load().check_rpc.map(|c| c.bind_addr))
        .unwrap_or_else(|| "0.0.0.0:8081".parse().expect("static addr"));

    let store = Arc::new(MemBookStore::new());
    rpc::check::serve(bind_addr, store).await?;
    Ok(())
}
