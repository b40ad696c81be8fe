//! HTTP gateway
//!
//! Terminates HTTP, re-types each request into its gRPC shape, makes
//! exactly one backend call, and maps the response (or error) back. RPC
//! errors always surface as non-2xx responses; nothing is swallowed.

pub mod http;
pub mod logic;
pub mod server;
pub mod trace;

pub use server::Gateway;
