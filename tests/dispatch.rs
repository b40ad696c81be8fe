//! End-to-end dispatch tests: HTTP gateway → gRPC backends → store
//!
//! Real tonic servers on ephemeral ports; HTTP requests go through the
//! router in process via `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::TcpListenerStream;
use tower::ServiceExt;

use bookstore::common::{Error, Result};
use bookstore::gateway::http::{create_router, GatewayState};
use bookstore::gateway::logic::{AddLogic, CheckLogic};
use bookstore::model::{BookRecord, BookStore, MemBookStore};
use bookstore::rpc::{AddClient, AddService, CheckClient, CheckService};

const RPC_TIMEOUT: Duration = Duration::from_secs(2);

struct BrokenStore;

impl BookStore for BrokenStore {
    fn insert(&self, _record: BookRecord) -> Result<()> {
        Err(Error::Storage("segment unreadable".to_string()))
    }

    fn find_one(&self, _book: &str) -> Result<Option<BookRecord>> {
        Err(Error::Storage("segment unreadable".to_string()))
    }
}

/// Spawn both backends over the given store and return a wired router.
async fn gateway_over(store: Arc<dyn BookStore>) -> axum::Router {
    let add_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let add_addr = add_listener.local_addr().unwrap();
    let add_store = store.clone();
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(AddService::new(add_store).into_server())
            .serve_with_incoming(TcpListenerStream::new(add_listener))
            .await
            .unwrap();
    });

    let check_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let check_addr = check_listener.local_addr().unwrap();
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(CheckService::new(store).into_server())
            .serve_with_incoming(TcpListenerStream::new(check_listener))
            .await
            .unwrap();
    });

    let add_client = AddClient::connect(&format!("http://{}", add_addr), RPC_TIMEOUT).unwrap();
    let check_client =
        CheckClient::connect(&format!("http://{}", check_addr), RPC_TIMEOUT).unwrap();

    create_router(GatewayState {
        add: Arc::new(AddLogic::new(Arc::new(add_client))),
        check: Arc::new(CheckLogic::new(Arc::new(check_client))),
    })
}

async fn post_json(router: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn add_then_check_round_trip() {
    let router = gateway_over(Arc::new(MemBookStore::new())).await;

    let (status, body) = post_json(
        &router,
        "/add",
        json!({ "book": "Dune", "price": 12.50 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, body) = post_json(&router, "/check", json!({ "book": "Dune" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], json!(true));
    assert_eq!(body["price"], json!(12.50));

    let (status, body) = post_json(&router, "/check", json!({ "book": "Foundation" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], json!(false));
}

#[tokio::test]
async fn storage_failure_surfaces_as_http_error() {
    let router = gateway_over(Arc::new(BrokenStore)).await;

    let (status, body) = post_json(
        &router,
        "/add",
        json!({ "book": "Dune", "price": 12.50 }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("segment unreadable"));

    // A genuine storage failure on check is an error response, never a
    // found:false body.
    let (status, body) = post_json(&router, "/check", json!({ "book": "Dune" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("found").is_none());
}

#[tokio::test]
async fn concurrent_adds_land_distinct_records() {
    let router = gateway_over(Arc::new(MemBookStore::new())).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            post_json(
                &router,
                "/add",
                json!({ "book": format!("book-{}", i), "price": i as f64 }),
            )
            .await
        }));
    }
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    for i in 0..8 {
        let (status, body) =
            post_json(&router, "/check", json!({ "book": format!("book-{}", i) })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["found"], json!(true));
        assert_eq!(body["price"], json!(i as f64));
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_gateway_error_not_a_hang() {
    // Point the gateway at a port nothing listens on.
    let add_client = AddClient::connect("http://127.0.0.1:1", RPC_TIMEOUT).unwrap();
    let check_client = CheckClient::connect("http://127.0.0.1:1", RPC_TIMEOUT).unwrap();
    let router = create_router(GatewayState {
        add: Arc::new(AddLogic::new(Arc::new(add_client))),
        check: Arc::new(CheckLogic::new(Arc::new(check_client))),
    });

    let (status, body) = post_json(
        &router,
        "/add",
        json!({ "book": "Dune", "price": 12.50 }),
    )
    .await;
    assert!(status.is_server_error());
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn malformed_body_is_rejected_without_an_rpc() {
    let router = gateway_over(Arc::new(MemBookStore::new())).await;

    let request = Request::builder()
        .method("POST")
        .uri("/add")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
