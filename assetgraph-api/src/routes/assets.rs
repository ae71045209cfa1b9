//! Asset REST API Routes
//!
//! - POST /api/v1/assets - Create an asset
//! - GET /api/v1/assets - Search assets, optionally with their links

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use assetgraph_query::{shape_rows, AssetSearch, CreateAssetRequest};

use crate::error::ApiResult;
use crate::service::AssetService;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/assets - Create a new asset
///
/// Responds 201 with the stored asset.
pub async fn create_asset(
    State(service): State<AssetService>,
    body: Result<Json<CreateAssetRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = body?;
    let asset = service.create_asset(&req).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET /api/v1/assets - Search assets
///
/// Each result is an array: the asset, then its inbound and/or outbound
/// neighbour lists when `whichLinks` asks for them.
pub async fn find_assets(
    State(service): State<AssetService>,
    params: Result<Query<AssetSearch>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(search) = params?;
    let rows = service.find_assets(&search).await?;
    Ok(Json(shape_rows(&rows)?))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(service: AssetService) -> Router {
    Router::new()
        .route("/", post(create_asset).get(find_assets))
        .with_state(service)
}
