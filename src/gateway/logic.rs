//! Per-operation dispatch logic
//!
//! One RPC call per HTTP call: no fan-out, no batching. Errors from the
//! backend propagate unchanged; the HTTP layer decides the status code.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::common::Result;
use crate::proto::{AddReq, CheckReq};
use crate::rpc::client::{AddBackend, CheckBackend};
use crate::rpc::json;

/// HTTP-facing request/response bodies. Same shape as the proto
/// messages, re-typed at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBody {
    pub book: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddReply {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckBody {
    pub book: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReply {
    pub found: bool,
    pub price: f64,
}

pub struct AddLogic {
    backend: Arc<dyn AddBackend>,
}

impl AddLogic {
    pub fn new(backend: Arc<dyn AddBackend>) -> Self {
        Self { backend }
    }

    pub async fn add(&self, body: AddBody) -> Result<AddReply> {
        let req = AddReq {
            book: body.book,
            price: body.price,
        };
        tracing::info!(payload = %json(&req), "dispatching add rpc");

        let resp = self.backend.add(req).await.inspect_err(|e| {
            tracing::error!(error = %e, "add rpc call failed");
        })?;

        tracing::info!(payload = %json(&resp), "add rpc replied");
        Ok(AddReply { ok: resp.ok })
    }
}

pub struct CheckLogic {
    backend: Arc<dyn CheckBackend>,
}

impl CheckLogic {
    pub fn new(backend: Arc<dyn CheckBackend>) -> Self {
        Self { backend }
    }

    pub async fn check(&self, body: CheckBody) -> Result<CheckReply> {
        let req = CheckReq { book: body.book };
        tracing::info!(payload = %json(&req), "dispatching check rpc");

        let resp = self.backend.check(req).await.inspect_err(|e| {
            tracing::error!(error = %e, "check rpc call failed");
        })?;

        tracing::info!(payload = %json(&resp), "check rpc replied");
        Ok(CheckReply {
            found: resp.found,
            price: resp.price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::proto::{AddResp, CheckResp};
    use async_trait::async_trait;

    struct FakeAdd(std::result::Result<bool, &'static str>);

    #[async_trait]
    impl AddBackend for FakeAdd {
        async fn add(&self, _req: AddReq) -> Result<AddResp> {
            match self.0 {
                Ok(ok) => Ok(AddResp { ok }),
                Err(msg) => Err(Error::Storage(msg.to_string())),
            }
        }
    }

    struct FakeCheck(Option<f64>);

    #[async_trait]
    impl CheckBackend for FakeCheck {
        async fn check(&self, _req: CheckReq) -> Result<CheckResp> {
            match self.0 {
                Some(price) => Ok(CheckResp { found: true, price }),
                None => Ok(CheckResp {
                    found: false,
                    price: 0.0,
                }),
            }
        }
    }

    #[tokio::test]
    async fn add_maps_response_shape() {
        let logic = AddLogic::new(Arc::new(FakeAdd(Ok(true))));
        let reply = logic
            .add(AddBody {
                book: "Dune".to_string(),
                price: 12.50,
            })
            .await
            .unwrap();
        assert!(reply.ok);
    }

    #[tokio::test]
    async fn backend_error_propagates_unchanged() {
        let logic = AddLogic::new(Arc::new(FakeAdd(Err("disk on fire"))));
        let err = logic
            .add(AddBody {
                book: "Dune".to_string(),
                price: 12.50,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn check_miss_keeps_found_false() {
        let logic = CheckLogic::new(Arc::new(FakeCheck(None)));
        let reply = logic
            .check(CheckBody {
                book: "Foundation".to_string(),
            })
            .await
            .unwrap();
        assert!(!reply.found);
    }
}
