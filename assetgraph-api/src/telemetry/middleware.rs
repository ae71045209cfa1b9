//! Axum Middleware for HTTP Request Tracing
//!
//! Wraps every request in an `http_request` span and logs its completion.
//! Only the path is recorded: query strings carry caller search values.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info_span, Instrument};

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.route = %path,
    );
    let response = next.run(request).instrument(span).await;

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Request completed"
        );
    }

    response
}
