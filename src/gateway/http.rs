//! Gateway HTTP surface: `POST /add` and `POST /check`

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::common::Error;
use crate::gateway::logic::{AddBody, AddLogic, CheckBody, CheckLogic};
use crate::gateway::trace::request_tracing_middleware;

#[derive(Clone)]
pub struct GatewayState {
    pub add: Arc<AddLogic>,
    pub check: Arc<CheckLogic>,
}

pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/add", post(add_handler))
        .route("/check", post(check_handler))
        .route("/health", axum::routing::get(health_handler))
        .layer(middleware::from_fn(request_tracing_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn add_handler(State(state): State<GatewayState>, Json(body): Json<AddBody>) -> Response {
    match state.add.add(body).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn check_handler(State(state): State<GatewayState>, Json(body): Json<CheckBody>) -> Response {
    match state.check.check(body).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn health_handler() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok", "version": crate::VERSION })))
        .into_response()
}

/// Every backend error becomes a structured non-2xx body.
fn error_response(e: Error) -> Response {
    let status = e.to_http_status();
    (
        status,
        Json(json!({
            "error": e.to_string(),
            "code": status.as_u16(),
        })),
    )
        .into_response()
}
