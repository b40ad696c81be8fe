//! Lease operations against the coordination store

use async_trait::async_trait;
use std::time::Duration;

use crate::common::Result;

/// Opaque lease handle issued by the coordination store.
pub type LeaseId = i64;

/// The narrow slice of the coordination store the publisher needs:
/// grant a lease, publish under it, renew it, revoke it.
#[async_trait]
pub trait LeaseStore: Send + Sync + 'static {
    /// Create a lease with the given time-to-live.
    async fn grant(&self, ttl: Duration) -> Result<LeaseId>;

    /// Publish `(key, value)`; the entry disappears when the lease expires.
    async fn put_under_lease(&self, key: &str, value: &str, lease: LeaseId) -> Result<()>;

    /// Extend the lease's remaining TTL by one renewal.
    ///
    /// `Err(Error::LeaseLost { .. })` means the store no longer knows the
    /// lease; any other error is a transient failure the caller may retry.
    async fn keep_alive(&self, lease: LeaseId) -> Result<()>;

    /// Revoke the lease so the published entry is removed promptly.
    async fn revoke(&self, lease: LeaseId) -> Result<()>;
}
