//! Request-id middleware for the gateway
//!
//! Gives every request a correlation id (reused from the `X-Request-ID`
//! header when the client sent one), wraps the handler in a span carrying
//! it, and echoes it back on the response.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
    middleware::Next,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Generate a new unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Middleware that adds a request ID and a per-request span.
pub async fn request_tracing_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(generate_request_id);

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    // Present when the router was built with connect info; absent in tests.
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
        client_ip = %client_ip,
    );

    let mut response = async {
        tracing::info!("request started");
        next.run(request).await
    }
    .instrument(span.clone())
    .await;

    let _guard = span.enter();
    let status = response.status();
    let duration = start.elapsed();

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    if status.is_success() {
        tracing::info!(
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "request completed"
        );
    } else {
        tracing::warn!(
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "request failed"
        );
    }

    response
}
