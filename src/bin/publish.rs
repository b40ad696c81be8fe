//! Publisher binary
//!
//! Registers a value in etcd under the service namespace and keeps the
//! lease alive until killed. Prints the published value once per second
//! as a liveness signal.

use anyhow::{bail, Result};
use bookstore::common::{Config, DiscoveryConfig};
use bookstore::Publisher;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookstore-publish")]
#[command(about = "Publishes a service value in etcd under a kept-alive lease")]
struct Args {
    /// The value to publish (typically this service's address)
    #[arg(short = 'v', long, default_value = "value")]
    value: String,

    /// etcd hosts, comma separated; the ETCD_HOSTS env var wins when set
    #[arg(long, value_delimiter = ',')]
    etcd: Option<Vec<String>>,

    /// Namespace key to publish under
    #[arg(long)]
    key: Option<String>,

    /// Lease time-to-live in seconds
    #[arg(long)]
    lease_ttl_secs: Option<u64>,

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

    let file = Config::load().discovery.unwrap_or_default();
    let endpoints = match std::env::var("ETCD_HOSTS") {
        Ok(hosts) if !hosts.is_empty() => hosts.split(',').map(str::to_string).collect(),
        _ => args.etcd.unwrap_or(file.endpoints),
    };
    let config = DiscoveryConfig {
        endpoints,
        service_key: args.key.unwrap_or(file.service_key),
        lease_ttl_secs: args.lease_ttl_secs.unwrap_or(file.lease_ttl_secs),
        renew_interval_ms: file.renew_interval_ms,
    };

    let publisher = Publisher::connect(&config).await?;
    let registration = publisher
        .register(&config.service_key, &args.value)
        .await?;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                registration.stop().await?;
                return Ok(());
            }
            res = registration.wait() => {
                // Lease expired before a renewal landed; a supervisor
                // should restart us to re-register.
                res?;
                bail!("registration ended unexpectedly");
            }
            _ = ticker.tick() => {
                println!("{}", args.value);
            }
        }
    }
}
