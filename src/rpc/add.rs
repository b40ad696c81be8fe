//! Add backend: persists one book record per call

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::{Request, Response, Status};

use crate::model::{BookRecord, BookStore};
use crate::proto::adder_server::{Adder, AdderServer};
use crate::proto::{AddReq, AddResp};
use crate::rpc::json;

pub struct AddService {
    store: Arc<dyn BookStore>,
}

impl AddService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Converts this service into a gRPC server instance.
    pub fn into_server(self) -> AdderServer<Self> {
        AdderServer::new(self)
    }
}

#[tonic::async_trait]
impl Adder for AddService {
    async fn add(&self, req: Request<AddReq>) -> Result<Response<AddResp>, Status> {
        let req = req.into_inner();
        tracing::info!(payload = %json(&req), "add rpc received");

        let record = BookRecord {
            book: req.book,
            price: req.price,
        };
        tracing::info!(payload = %json(&record), "add rpc inserting record");

        if let Err(e) = self.store.insert(record) {
            tracing::error!(error = %e, "add rpc insert failed");
            return Err(e.to_grpc_status());
        }

        let resp = AddResp { ok: true };
        tracing::info!(payload = %json(&resp), "add rpc response");
        Ok(Response::new(resp))
    }
}

/// Serve the Add backend on the given address.
pub async fn serve(addr: SocketAddr, store: Arc<dyn BookStore>) -> crate::common::Result<()> {
    tracing::info!(%addr, "add backend listening");
    tonic::transport::Server::builder()
        .add_service(AddService::new(store).into_server())
        .serve(addr)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::model::MemBookStore;

    struct BrokenStore;

    impl BookStore for BrokenStore {
        fn insert(&self, _record: BookRecord) -> crate::common::Result<()> {
            Err(Error::Storage("disk on fire".to_string()))
        }

        fn find_one(&self, _book: &str) -> crate::common::Result<Option<BookRecord>> {
            Err(Error::Storage("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn add_inserts_exactly_one_record() {
        let store = Arc::new(MemBookStore::new());
        let svc = AddService::new(store.clone());

        let resp = svc
            .add(Request::new(AddReq {
                book: "Dune".to_string(),
                price: 12.50,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.ok);
        assert_eq!(store.find_one("Dune").unwrap().unwrap().price, 12.50);
    }

    #[tokio::test]
    async fn storage_failure_propagates_as_internal() {
        let svc = AddService::new(Arc::new(BrokenStore));

        let status = svc
            .add(Request::new(AddReq {
                book: "Dune".to_string(),
                price: 12.50,
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(status.message().contains("disk on fire"));
    }
}
