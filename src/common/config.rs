//! Configuration for bookstore components

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::common::{Error, Result};

/// Global configuration, loadable from `bookstore.toml` plus
/// `BOOKSTORE__*` environment variables. CLI flags override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway-specific config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    /// Add backend config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_rpc: Option<RpcConfig>,

    /// Check backend config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_rpc: Option<RpcConfig>,

    /// Service registration config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryConfig>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: None,
            add_rpc: None,
            check_rpc: None,
            discovery: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from `bookstore.toml` (if present) and the environment.
    /// Falls back to defaults when neither is usable.
    pub fn load() -> Self {
        config::Config::builder()
            .add_source(config::File::with_name("bookstore").required(false))
            .add_source(config::Environment::with_prefix("BOOKSTORE").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap_or_default()
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind address for the HTTP API
    pub bind_addr: SocketAddr,

    /// Add backend endpoint (e.g. http://127.0.0.1:8080)
    pub add_backend: String,

    /// Check backend endpoint (e.g. http://127.0.0.1:8081)
    pub check_backend: String,

    /// Per-request RPC deadline
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8888".parse().expect("static addr"),
            add_backend: "http://127.0.0.1:8080".to_string(),
            check_backend: "http://127.0.0.1:8081".to_string(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// RPC backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Bind address for the gRPC server
    pub bind_addr: SocketAddr,
}

/// Service registration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// etcd endpoints; any reachable one suffices
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Namespace key the service publishes under
    #[serde(default = "default_service_key")]
    pub service_key: String,

    /// Lease time-to-live in seconds
    #[serde(default = "default_lease_ttl_secs")]
    pub lease_ttl_secs: u64,

    /// Renewal period in milliseconds; defaults to TTL/3 when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renew_interval_ms: Option<u64>,
}

fn default_endpoints() -> Vec<String> {
    vec!["etcd.discovery:2379".to_string()]
}

fn default_service_key() -> String {
    "028F2C35852D".to_string()
}

fn default_lease_ttl_secs() -> u64 {
    10
}

impl DiscoveryConfig {
    pub fn lease_ttl(&self) -> Duration {
        Duration::from_secs(self.lease_ttl_secs)
    }

    /// Renewal period, conservative enough to tolerate a missed tick or two.
    pub fn renew_interval(&self) -> Duration {
        match self.renew_interval_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_secs((self.lease_ttl_secs / 3).max(1)),
        }
    }

    /// The renewal period must leave slack inside the TTL window.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::InvalidConfig("no etcd endpoints".into()));
        }
        if self.lease_ttl_secs == 0 {
            return Err(Error::InvalidConfig("lease TTL must be non-zero".into()));
        }
        if self.renew_interval() >= self.lease_ttl() {
            return Err(Error::InvalidConfig(format!(
                "renewal period {:?} must be shorter than lease TTL {:?}",
                self.renew_interval(),
                self.lease_ttl()
            )));
        }
        Ok(())
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            service_key: default_service_key(),
            lease_ttl_secs: default_lease_ttl_secs(),
            renew_interval_ms: None,
        }
    }
}
