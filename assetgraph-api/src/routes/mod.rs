//! REST API Route Handlers
//!
//! Route layout:
//! - /api/v1/assets - Create and search assets
//! - /api/v1/links - Create and delete links
//! - /health - Liveness and readiness

pub mod assets;
pub mod health;
pub mod links;

use axum::{extract::Request, middleware::from_fn, Router};
use tower_http::trace::TraceLayer;

use crate::service::AssetService;
use crate::telemetry::observability_middleware;

/// Build the full application router.
///
/// Layers, outermost first:
/// 1. HTTP trace layer
/// 2. Request span and completion log
pub fn create_router(service: AssetService) -> Router {
    let api_routes = Router::new()
        .nest("/assets", assets::create_router(service.clone()))
        .nest("/links", links::create_router(service.clone()));

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router(service))
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            // Path only: query strings carry search values.
            tracing::debug_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
}
