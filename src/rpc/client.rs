//! Typed clients for the Add and Check backends
//!
//! Every call carries the caller's deadline twice: as the grpc-timeout
//! header for the server, and as a local `tokio::time::timeout` so the
//! in-flight call is dropped (not merely ignored) when the deadline
//! passes.

use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

use crate::common::{Error, Result};
use crate::proto::adder_client::AdderClient;
use crate::proto::checker_client::CheckerClient;
use crate::proto::{AddReq, AddResp, CheckReq, CheckResp};

/// Transport seam the gateway dispatches through; fakes implement these
/// in tests.
#[async_trait]
pub trait AddBackend: Send + Sync {
    async fn add(&self, req: AddReq) -> Result<AddResp>;
}

#[async_trait]
pub trait CheckBackend: Send + Sync {
    async fn check(&self, req: CheckReq) -> Result<CheckResp>;
}

fn endpoint(addr: &str, timeout: Duration) -> Result<Endpoint> {
    Endpoint::from_shared(addr.to_string())
        .map_err(|e| Error::InvalidConfig(format!("backend endpoint {}: {}", addr, e)))
        .map(|e| e.connect_timeout(timeout))
}

pub struct AddClient {
    inner: AdderClient<Channel>,
    timeout: Duration,
}

impl AddClient {
    /// Lazy connect so the gateway can start before its backends.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let channel = endpoint(addr, timeout)?.connect_lazy();
        Ok(Self {
            inner: AdderClient::new(channel),
            timeout,
        })
    }
}

#[async_trait]
impl AddBackend for AddClient {
    async fn add(&self, req: AddReq) -> Result<AddResp> {
        let mut client = self.inner.clone();
        let mut request = tonic::Request::new(req);
        request.set_timeout(self.timeout);

        let response = tokio::time::timeout(self.timeout, client.add(request))
            .await
            .map_err(|_| Error::Timeout("add rpc".to_string()))??;
        Ok(response.into_inner())
    }
}

pub struct CheckClient {
    inner: CheckerClient<Channel>,
    timeout: Duration,
}

impl CheckClient {
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let channel = endpoint(addr, timeout)?.connect_lazy();
        Ok(Self {
            inner: CheckerClient::new(channel),
            timeout,
        })
    }
}

#[async_trait]
impl CheckBackend for CheckClient {
    async fn check(&self, req: CheckReq) -> Result<CheckResp> {
        let mut client = self.inner.clone();
        let mut request = tonic::Request::new(req);
        request.set_timeout(self.timeout);

        let response = tokio::time::timeout(self.timeout, client.check(request))
            .await
            .map_err(|_| Error::Timeout("check rpc".to_string()))??;
        Ok(response.into_inner())
    }
}
