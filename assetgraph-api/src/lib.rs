//! AssetGraph API - HTTP surface for the asset graph
//!
//! Axum routes over [`AssetService`], which validates requests, builds
//! parameterized Cypher and runs it against a [`GraphStore`].
//!
//! [`GraphStore`]: assetgraph_storage::GraphStore

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod telemetry;

pub use config::{ApiConfig, StoreKind};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_router;
pub use service::AssetService;
