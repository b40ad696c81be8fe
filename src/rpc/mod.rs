//! gRPC backends and their typed clients
//!
//! Each backend performs exactly one storage operation per call and
//! propagates storage failures unchanged; retries, if any, belong to the
//! caller.

pub mod add;
pub mod check;
pub mod client;

pub use add::AddService;
pub use check::CheckService;
pub use client::{AddBackend, AddClient, CheckBackend, CheckClient};

/// Marshal a payload for log lines.
pub(crate) fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
