//! AssetGraph Storage - Graph Store Traits and Implementations
//!
//! Defines the session abstraction the execution adapter runs queries
//! through, the adapter itself, an in-memory store for tests and local runs,
//! and (behind the `neo4j` feature) the Neo4j store.

use assetgraph_core::{AssetGraphResult, Row};
use assetgraph_query::CypherQuery;
use async_trait::async_trait;

pub mod config;
pub mod executor;
pub mod memory;
#[cfg(feature = "neo4j")]
pub mod neo4j;

pub use config::GraphConfig;
pub use executor::QueryExecutor;
pub use memory::{InMemoryGraph, SessionStats};
#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jStore;

// ============================================================================
// STORE TRAITS
// ============================================================================

/// A handle that hands out sessions.
///
/// Implementations are shared across requests behind an `Arc`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a new session. Each request opens its own.
    async fn open_session(&self) -> AssetGraphResult<Box<dyn GraphSession>>;
}

/// A unit of work against the store.
///
/// Every run executes in its own transaction. Consumers must call
/// [`GraphSession::close`] exactly once, whatever the run returned.
#[async_trait]
pub trait GraphSession: Send {
    /// Run a query in a write transaction and collect every row.
    async fn run_write(&mut self, query: &CypherQuery) -> AssetGraphResult<Vec<Row>>;

    /// Run a query in a read transaction and collect every row.
    async fn run_read(&mut self, query: &CypherQuery) -> AssetGraphResult<Vec<Row>>;

    /// Release the session.
    async fn close(self: Box<Self>) -> AssetGraphResult<()>;
}
