//! Health Check Endpoints
//!
//! - /health - Liveness
//! - /health/ready - Store connectivity

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::service::AssetService;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health - Process liveness check
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
        latency_ms: None,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Readiness check (store connectivity)
pub async fn readiness(State(service): State<AssetService>) -> impl IntoResponse {
    let start = Instant::now();

    let (status_code, response) = match service.check_store().await {
        Ok(()) => (
            StatusCode::OK,
            HealthResponse {
                status: HealthStatus::Healthy,
                message: None,
                latency_ms: Some(start.elapsed().as_millis() as u64),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse {
                    status: HealthStatus::Unhealthy,
                    message: Some(format!("Store check failed: {}", e)),
                    latency_ms: None,
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            )
        }
    };

    (status_code, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router (no auth required)
pub fn create_router(service: AssetService) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/ready", get(readiness))
        .with_state(service)
}
