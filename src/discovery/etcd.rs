//! etcd-backed lease store

use async_trait::async_trait;
use etcd_client::{Client, PutOptions};
use std::time::Duration;

use crate::common::{Error, Result};
use crate::discovery::lease::{LeaseId, LeaseStore};

/// Lease operations over a connected etcd client.
///
/// The inner client multiplexes one channel, so per-call clones are cheap.
pub struct EtcdLeaseStore {
    client: Client,
}

impl EtcdLeaseStore {
    /// Connect to etcd across the endpoint set; any reachable one suffices.
    pub async fn connect(endpoints: &[String]) -> Result<Self> {
        let client = Client::connect(endpoints, None)
            .await
            .map_err(|e| Error::ConnectFailed(format!("etcd {:?}: {}", endpoints, e)))?;
        tracing::info!(endpoints = ?endpoints, "connected to etcd");
        Ok(Self { client })
    }
}

#[async_trait]
impl LeaseStore for EtcdLeaseStore {
    async fn grant(&self, ttl: Duration) -> Result<LeaseId> {
        let mut client = self.client.clone();
        let resp = client
            .lease_grant(ttl.as_secs() as i64, None)
            .await
            .map_err(|e| Error::Transport(format!("lease grant: {}", e)))?;
        Ok(resp.id())
    }

    async fn put_under_lease(&self, key: &str, value: &str, lease: LeaseId) -> Result<()> {
        let mut client = self.client.clone();
        client
            .put(key, value, Some(PutOptions::new().with_lease(lease)))
            .await
            .map_err(|e| Error::Transport(format!("put {}: {}", key, e)))?;
        Ok(())
    }

    async fn keep_alive(&self, lease: LeaseId) -> Result<()> {
        let mut client = self.client.clone();
        let (mut keeper, mut stream) = client
            .lease_keep_alive(lease)
            .await
            .map_err(|e| Error::Transport(format!("keepalive open: {}", e)))?;
        keeper
            .keep_alive()
            .await
            .map_err(|e| Error::Transport(format!("keepalive send: {}", e)))?;

        // A response with TTL 0 means etcd already expired the lease.
        match stream.message().await {
            Ok(Some(resp)) if resp.ttl() > 0 => Ok(()),
            Ok(_) => Err(Error::LeaseLost {
                key: lease.to_string(),
                reason: "lease expired on the store".to_string(),
            }),
            Err(e) => Err(Error::Transport(format!("keepalive recv: {}", e))),
        }
    }

    async fn revoke(&self, lease: LeaseId) -> Result<()> {
        let mut client = self.client.clone();
        client
            .lease_revoke(lease)
            .await
            .map_err(|e| Error::Transport(format!("lease revoke: {}", e)))?;
        Ok(())
    }
}
