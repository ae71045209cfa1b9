//! Link REST API Routes
//!
//! - POST /api/v1/links - Create a typed link between two assets
//! - DELETE /api/v1/links?idFrom=&idTo=&type= - Delete that link
//!
//! A request whose endpoints (or link, for delete) do not exist is not an
//! error: it answers 202 with a message and leaves the graph unchanged.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use assetgraph_query::{LinkOutcome, LinkRequest};

use crate::error::ApiResult;
use crate::service::AssetService;

/// Body of a 202 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoMatchResponse {
    pub message: String,
}

fn outcome_response(outcome: LinkOutcome, applied: StatusCode) -> Response {
    match outcome {
        LinkOutcome::Applied {
            source,
            target,
            link,
        } => (applied, Json((source, target, link))).into_response(),
        LinkOutcome::NoMatch { message } => {
            (StatusCode::ACCEPTED, Json(NoMatchResponse { message })).into_response()
        }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/links - Create a link
///
/// 201 with `[source, target, link]` when applied.
pub async fn create_link(
    State(service): State<AssetService>,
    body: Result<Json<LinkRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = body?;
    let outcome = service.create_link(&req).await?;
    Ok(outcome_response(outcome, StatusCode::CREATED))
}

/// DELETE /api/v1/links - Delete a link
///
/// 200 with `[source, target, link]` when applied.
pub async fn delete_link(
    State(service): State<AssetService>,
    params: Result<Query<LinkRequest>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(req) = params?;
    let outcome = service.delete_link(&req).await?;
    Ok(outcome_response(outcome, StatusCode::OK))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(service: AssetService) -> Router {
    Router::new()
        .route("/", post(create_link).delete(delete_link))
        .with_state(service)
}
