//! Asset service
//!
//! The four operations exposed to callers. Each one validates and builds its
//! query before the store is touched, so a validation failure never opens a
//! session.

use assetgraph_core::{Asset, AssetGraphResult, Link, Row, StorageError};
use assetgraph_query::{
    builder, shape_created_asset, shape_link_outcome, shape_search_rows, AssetSearch,
    CreateAssetRequest, CypherQuery, LinkOutcome, LinkRequest, Statement,
};
use assetgraph_storage::{GraphStore, QueryExecutor};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entry point for asset and link operations.
#[derive(Clone)]
pub struct AssetService {
    executor: QueryExecutor,
    store: Arc<dyn GraphStore>,
}

impl AssetService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            executor: QueryExecutor::new(Arc::clone(&store)),
            store,
        }
    }

    /// Create an asset and return the stored record.
    pub async fn create_asset(&self, req: &CreateAssetRequest) -> AssetGraphResult<Asset> {
        let query = builder::create_asset(req)?;
        let rows = self.executor.execute(&query).await?;
        let asset = shape_created_asset(rows)?;
        info!(asset_id = %asset.id, "Asset created");
        Ok(asset)
    }

    /// Search assets. Rows are `[a]`, `[a, inbound]`, `[a, outbound]` or
    /// `[a, inbound, outbound]` depending on `whichLinks`.
    pub async fn find_assets(&self, search: &AssetSearch) -> AssetGraphResult<Vec<Row>> {
        let search = builder::find_assets(search)?;
        let rows = self.executor.execute(search.query()).await?;
        let rows = shape_search_rows(rows, &search)?;
        debug!(matches = rows.len(), links = ?search.links(), "Asset search complete");
        Ok(rows)
    }

    /// Create a link if both endpoints exist. Re-creating an existing link is not an error.
    pub async fn create_link(&self, req: &LinkRequest) -> AssetGraphResult<LinkOutcome> {
        let query = builder::create_link(req)?;
        self.run_link(&query, "created").await
    }

    /// Delete a link if it exists.
    pub async fn delete_link(&self, req: &LinkRequest) -> AssetGraphResult<LinkOutcome> {
        let query = builder::delete_link(req)?;
        self.run_link(&query, "deleted").await
    }

    /// Open and close a session to confirm the store is reachable.
    pub async fn check_store(&self) -> AssetGraphResult<()> {
        let session = self.store.open_session().await?;
        session.close().await
    }

    async fn run_link(&self, query: &CypherQuery, action: &str) -> AssetGraphResult<LinkOutcome> {
        let requested = requested_link(query)?;
        let rows = self.executor.execute(query).await?;
        let outcome = shape_link_outcome(rows, requested)?;

        match &outcome {
            LinkOutcome::Applied { link, .. } => {
                info!(from = %link.from, to = %link.to, rel_type = %link.rel_type, "Link {}", action);
            }
            LinkOutcome::NoMatch { message } => {
                warn!(from = %requested.from, to = %requested.to, "{}", message);
            }
        }
        Ok(outcome)
    }
}

fn requested_link(query: &CypherQuery) -> Result<&Link, StorageError> {
    match query.statement() {
        Statement::MergeLink(link) | Statement::DeleteLink(link) => Ok(link),
        _ => Err(StorageError::QueryFailed {
            reason: "not a link statement".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetgraph_core::{AssetGraphError, Decimal, ValidationError};
    use assetgraph_storage::InMemoryGraph;
    use assetgraph_test_utils::fixtures;

    fn service() -> (AssetService, InMemoryGraph) {
        let graph = InMemoryGraph::new();
        (AssetService::new(Arc::new(graph.clone())), graph)
    }

    #[tokio::test]
    async fn test_create_asset_exact_values() {
        let (service, graph) = service();
        let asset = service
            .create_asset(&fixtures::laptop_request())
            .await
            .unwrap();
        assert_eq!(asset.price, Decimal::new(124_999, 2));
        assert_eq!(graph.get_asset(&asset.id), Some(asset));
    }

    #[tokio::test]
    async fn test_validation_failure_opens_no_session() {
        let (service, graph) = service();
        let req = CreateAssetRequest {
            name: Some("   ".to_string()),
            ..fixtures::laptop_request()
        };
        let err = service.create_asset(&req).await.unwrap_err();
        assert_eq!(
            err,
            AssetGraphError::Validation(ValidationError::missing_field("name"))
        );

        let err = service.find_assets(&AssetSearch::default()).await.unwrap_err();
        assert_eq!(err, AssetGraphError::Validation(ValidationError::NoSearchCriteria));
        assert_eq!(graph.session_stats().opened, 0);
    }

    #[tokio::test]
    async fn test_link_round_trip() {
        let (service, _graph) = service();
        let a = service.create_asset(&fixtures::laptop_request()).await.unwrap();
        let b = service.create_asset(&fixtures::desk_request()).await.unwrap();
        let req = fixtures::owns(&a, &b);

        let created = service.create_link(&req).await.unwrap();
        let deleted = service.delete_link(&req).await.unwrap();
        assert!(matches!(created, LinkOutcome::Applied { .. }));
        assert_eq!(created, deleted);

        let again = service.delete_link(&req).await.unwrap();
        assert!(matches!(again, LinkOutcome::NoMatch { .. }));
    }

    #[tokio::test]
    async fn test_check_store_balances_sessions() {
        let (service, graph) = service();
        service.check_store().await.unwrap();
        let stats = graph.session_stats();
        assert_eq!((stats.opened, stats.closed), (1, 1));
    }
}
