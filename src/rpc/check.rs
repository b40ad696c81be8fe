//! Check backend: read-only price lookup
//!
//! A lookup miss is an expected outcome and comes back as
//! `{found: false}`; only a genuine storage failure becomes a gRPC error.

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::{Request, Response, Status};

use crate::model::BookStore;
use crate::proto::checker_server::{Checker, CheckerServer};
use crate::proto::{CheckReq, CheckResp};
use crate::rpc::json;

pub struct CheckService {
    store: Arc<dyn BookStore>,
}

impl CheckService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Converts this service into a gRPC server instance.
    pub fn into_server(self) -> CheckerServer<Self> {
        CheckerServer::new(self)
    }
}

#[tonic::async_trait]
impl Checker for CheckService {
    async fn check(&self, req: Request<CheckReq>) -> Result<Response<CheckResp>, Status> {
        let req = req.into_inner();
        tracing::info!(payload = %json(&req), "check rpc received");

        let resp = match self.store.find_one(&req.book) {
            Ok(Some(record)) => CheckResp {
                found: true,
                price: record.price,
            },
            Ok(None) => CheckResp {
                found: false,
                price: 0.0,
            },
            Err(e) => {
                tracing::error!(book = %req.book, error = %e, "check rpc lookup failed");
                return Err(e.to_grpc_status());
            }
        };

        tracing::info!(payload = %json(&resp), "check rpc response");
        Ok(Response::new(resp))
    }
}

/// Serve the Check backend on the given address.
pub async fn serve(addr: SocketAddr, store: Arc<dyn BookStore>) -> crate::common::Result<()> {
    tracing::info!(%addr, "check backend listening");
    tonic::transport::Server::builder()
        .add_service(CheckService::new(store).into_server())
        .serve(addr)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::model::{BookRecord, MemBookStore};

    struct BrokenStore;

    impl BookStore for BrokenStore {
        fn insert(&self, _record: BookRecord) -> crate::common::Result<()> {
            Err(Error::Storage("index corrupted".to_string()))
        }

        fn find_one(&self, _book: &str) -> crate::common::Result<Option<BookRecord>> {
            Err(Error::Storage("index corrupted".to_string()))
        }
    }

    #[tokio::test]
    async fn hit_returns_stored_price() {
        let store = Arc::new(MemBookStore::new());
        store
            .insert(BookRecord {
                book: "Dune".to_string(),
                price: 12.50,
            })
            .unwrap();
        let svc = CheckService::new(store);

        let resp = svc
            .check(Request::new(CheckReq {
                book: "Dune".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.found);
        assert_eq!(resp.price, 12.50);
    }

    #[tokio::test]
    async fn miss_is_found_false_not_an_error() {
        let svc = CheckService::new(Arc::new(MemBookStore::new()));

        let resp = svc
            .check(Request::new(CheckReq {
                book: "Foundation".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!resp.found);
    }

    #[tokio::test]
    async fn storage_failure_is_distinguishable_from_a_miss() {
        let svc = CheckService::new(Arc::new(BrokenStore));

        let status = svc
            .check(Request::new(CheckReq {
                book: "Dune".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), tonic::Code::Internal);
    }
}
