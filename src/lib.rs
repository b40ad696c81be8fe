//! # bookstore
//!
//! A small distributed bookstore service:
//! - An HTTP gateway that translates JSON requests into gRPC calls
//! - Two gRPC backends (Add, Check), each owning a book record store
//! - A publisher that registers a service address in etcd and keeps the
//!   registration alive with periodic lease renewal
//!
//! ## Architecture
//!
//! ```text
//!            HTTP (JSON)
//! client ───────────────► ┌──────────┐
//!                         │ Gateway  │
//!                         └────┬─────┘
//!                       gRPC   │   gRPC
//!                  ┌───────────┴───────────┐
//!            ┌─────▼─────┐           ┌─────▼─────┐
//!            │ Add  RPC  │           │ Check RPC │
//!            │  + store  │           │  + store  │
//!            └───────────┘           └───────────┘
//!
//!            ┌───────────┐   lease + keepalive   ┌──────┐
//!            │ Publisher │ ────────────────────► │ etcd │
//!            └───────────┘                       └──────┘
//! ```
//!
//! ## Usage
//!
//! ### Start the backends
//! ```bash
//! bookstore-add --bind 0.0.0.0:8080
//! bookstore-check --bind 0.0.0.0:8081
//! ```
//!
//! ### Start the gateway
//! ```bash
//! bookstore-gateway \
//!   --bind 0.0.0.0:8888 \
//!   --add-backend http://127.0.0.1:8080 \
//!   --check-backend http://127.0.0.1:8081
//! ```
//!
//! ### Publish a service address
//! ```bash
//! bookstore-publish -v 127.0.0.1:8080 --etcd etcd.discovery:2379
//! ```

pub mod common;
pub mod discovery;
pub mod gateway;
pub mod model;
pub mod rpc;

// Re-export commonly used types
pub use common::{Config, Error, Result};
pub use discovery::Publisher;
pub use gateway::Gateway;
pub use model::{BookRecord, BookStore, MemBookStore};

// Generated protobuf code
pub mod proto {
    tonic::include_proto!("bookstore");
}

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
