//! AssetGraph API Server Entry Point
//!
//! Bootstraps telemetry and configuration, connects the graph store and
//! starts the Axum HTTP server.

use std::sync::Arc;

use assetgraph_api::telemetry::{init_tracing, TelemetryConfig};
use assetgraph_api::{create_router, ApiConfig, ApiError, ApiResult, AssetService, StoreKind};
use assetgraph_storage::{GraphStore, InMemoryGraph};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let store = connect_store(api_config.store).await?;
    let app = create_router(AssetService::new(store));

    let addr = api_config.socket_addr()?;
    tracing::info!(%addr, store = ?api_config.store, "Starting AssetGraph API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn connect_store(kind: StoreKind) -> ApiResult<Arc<dyn GraphStore>> {
    match kind {
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(InMemoryGraph::new()))
        }
        #[cfg(feature = "neo4j")]
        StoreKind::Neo4j => {
            let config = assetgraph_storage::GraphConfig::from_env();
            let store = assetgraph_storage::Neo4jStore::connect(&config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "neo4j"))]
        StoreKind::Neo4j => Err(ApiError::invalid_input(
            "Built without the neo4j feature; set ASSETGRAPH_STORE=memory",
        )),
    }
}
