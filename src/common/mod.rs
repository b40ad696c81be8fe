//! Common utilities and types shared across bookstore

pub mod config;
pub mod error;

pub use config::{Config, DiscoveryConfig, GatewayConfig, RpcConfig};
pub use error::{Error, Result};
