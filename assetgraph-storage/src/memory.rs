//! In-memory graph store
//!
//! Evaluates the typed `Statement` carried by each query instead of parsing
//! Cypher. Used by tests and by the API when `ASSETGRAPH_STORE=memory`.
//! Results follow the same column layout and ordering (by asset id) as the
//! Cypher the builder renders.

use assetgraph_core::{
    Asset, AssetGraphResult, AssetId, GraphValue, Link, Row, StorageError,
};
use assetgraph_query::{CypherQuery, LinkSelector, SearchCriterion, Statement};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::trace;

use crate::{GraphSession, GraphStore};

// ============================================================================
// GRAPH DATA
// ============================================================================

#[derive(Debug, Default)]
struct GraphData {
    assets: BTreeMap<AssetId, Asset>,
    links: Vec<Link>,
}

impl GraphData {
    fn endpoints(&self, link: &Link) -> Option<(&Asset, &Asset)> {
        Some((self.assets.get(&link.from)?, self.assets.get(&link.to)?))
    }

    fn applied_row(&self, link: &Link) -> Option<Row> {
        let (source, target) = self.endpoints(link)?;
        Some(vec![
            GraphValue::Asset(source.clone()),
            GraphValue::Asset(target.clone()),
            GraphValue::Link(link.clone()),
        ])
    }

    /// Distinct neighbours of `id` over links of any type, ordered by id.
    fn neighbours(&self, id: &str, inbound: bool) -> GraphValue {
        let ids: BTreeSet<&str> = self
            .links
            .iter()
            .filter_map(|l| {
                if inbound {
                    (l.to == id).then_some(l.from.as_str())
                } else {
                    (l.from == id).then_some(l.to.as_str())
                }
            })
            .collect();
        GraphValue::List(
            ids.into_iter()
                .filter_map(|id| self.assets.get(id))
                .cloned()
                .map(GraphValue::Asset)
                .collect(),
        )
    }

    fn create_asset(&mut self, asset: &Asset) -> Result<Vec<Row>, StorageError> {
        if self.assets.contains_key(&asset.id) {
            return Err(StorageError::QueryFailed {
                reason: format!("Node with label Asset and property id = '{}' already exists", asset.id),
            });
        }
        self.assets.insert(asset.id.clone(), asset.clone());
        Ok(vec![vec![GraphValue::Asset(asset.clone())]])
    }

    fn find_assets(&self, criteria: &[SearchCriterion], links: LinkSelector) -> Vec<Row> {
        self.assets
            .values()
            .filter(|asset| criteria.iter().all(|c| c.matches(asset)))
            .map(|asset| {
                let mut row = vec![GraphValue::Asset(asset.clone())];
                if links.includes_inbound() {
                    row.push(self.neighbours(&asset.id, true));
                }
                if links.includes_outbound() {
                    row.push(self.neighbours(&asset.id, false));
                }
                row
            })
            .collect()
    }

    fn merge_link(&mut self, link: &Link) -> Vec<Row> {
        let Some(row) = self.applied_row(link) else {
            return Vec::new();
        };
        if !self.links.contains(link) {
            self.links.push(link.clone());
        }
        vec![row]
    }

    fn delete_link(&mut self, link: &Link) -> Vec<Row> {
        let Some(position) = self.links.iter().position(|l| l == link) else {
            return Vec::new();
        };
        let Some(row) = self.applied_row(link) else {
            return Vec::new();
        };
        self.links.remove(position);
        vec![row]
    }
}

// ============================================================================
// SESSION ACCOUNTING
// ============================================================================

/// Snapshot of session activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub opened: usize,
    pub closed: usize,
    pub read_runs: usize,
    pub write_runs: usize,
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    read_runs: AtomicUsize,
    write_runs: AtomicUsize,
}

/// One-shot failures to inject into the next open, run or close.
#[derive(Debug, Default)]
struct Faults {
    open: Mutex<Option<StorageError>>,
    run: Mutex<Option<StorageError>>,
    close: Mutex<Option<StorageError>>,
}

fn take_fault(slot: &Mutex<Option<StorageError>>) -> Option<StorageError> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

fn arm_fault(slot: &Mutex<Option<StorageError>>, error: StorageError) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
}

// ============================================================================
// STORE
// ============================================================================

/// In-memory graph store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraph {
    data: Arc<RwLock<GraphData>>,
    counters: Arc<Counters>,
    faults: Arc<Faults>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every asset and link.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut data = self.data.write().map_err(|_| StorageError::LockPoisoned)?;
        data.assets.clear();
        data.links.clear();
        Ok(())
    }

    pub fn asset_count(&self) -> usize {
        self.data.read().map(|d| d.assets.len()).unwrap_or(0)
    }

    pub fn link_count(&self) -> usize {
        self.data.read().map(|d| d.links.len()).unwrap_or(0)
    }

    pub fn get_asset(&self, id: &str) -> Option<Asset> {
        self.data.read().ok()?.assets.get(id).cloned()
    }

    pub fn has_link(&self, link: &Link) -> bool {
        self.data
            .read()
            .map(|d| d.links.contains(link))
            .unwrap_or(false)
    }

    pub fn session_stats(&self) -> SessionStats {
        SessionStats {
            opened: self.counters.opened.load(Ordering::SeqCst),
            closed: self.counters.closed.load(Ordering::SeqCst),
            read_runs: self.counters.read_runs.load(Ordering::SeqCst),
            write_runs: self.counters.write_runs.load(Ordering::SeqCst),
        }
    }

    /// Make the next `open_session` fail.
    pub fn fail_next_open(&self, error: StorageError) {
        arm_fault(&self.faults.open, error);
    }

    /// Make the next run (read or write) fail without touching data.
    pub fn fail_next_run(&self, error: StorageError) {
        arm_fault(&self.faults.run, error);
    }

    /// Make the next session close fail.
    pub fn fail_next_close(&self, error: StorageError) {
        arm_fault(&self.faults.close, error);
    }

    fn evaluate_write(&self, statement: &Statement) -> Result<Vec<Row>, StorageError> {
        let mut data = self.data.write().map_err(|_| StorageError::LockPoisoned)?;
        match statement {
            Statement::CreateAsset(asset) => data.create_asset(asset),
            Statement::FindAssets { criteria, links } => Ok(data.find_assets(criteria, *links)),
            Statement::MergeLink(link) => Ok(data.merge_link(link)),
            Statement::DeleteLink(link) => Ok(data.delete_link(link)),
        }
    }

    fn evaluate_read(&self, statement: &Statement) -> Result<Vec<Row>, StorageError> {
        let data = self.data.read().map_err(|_| StorageError::LockPoisoned)?;
        match statement {
            Statement::FindAssets { criteria, links } => Ok(data.find_assets(criteria, *links)),
            Statement::CreateAsset(_) | Statement::MergeLink(_) | Statement::DeleteLink(_) => {
                Err(StorageError::QueryFailed {
                    reason: "Writing in read access mode not allowed".to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn open_session(&self) -> AssetGraphResult<Box<dyn GraphSession>> {
        if let Some(error) = take_fault(&self.faults.open) {
            return Err(error.into());
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemorySession {
            graph: self.clone(),
        }))
    }
}

/// Session over an [`InMemoryGraph`].
pub struct InMemorySession {
    graph: InMemoryGraph,
}

#[async_trait]
impl GraphSession for InMemorySession {
    async fn run_write(&mut self, query: &CypherQuery) -> AssetGraphResult<Vec<Row>> {
        self.graph.counters.write_runs.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = take_fault(&self.graph.faults.run) {
            return Err(error.into());
        }
        trace!(statement = ?query.statement(), "In-memory write");
        Ok(self.graph.evaluate_write(query.statement())?)
    }

    async fn run_read(&mut self, query: &CypherQuery) -> AssetGraphResult<Vec<Row>> {
        self.graph.counters.read_runs.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = take_fault(&self.graph.faults.run) {
            return Err(error.into());
        }
        trace!(statement = ?query.statement(), "In-memory read");
        Ok(self.graph.evaluate_read(query.statement())?)
    }

    async fn close(self: Box<Self>) -> AssetGraphResult<()> {
        self.graph.counters.closed.fetch_add(1, Ordering::SeqCst);
        match take_fault(&self.graph.faults.close) {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetgraph_query::{
        create_asset, create_link, delete_link, find_assets, AssetSearch, CreateAssetRequest,
        LinkRequest, SearchField,
    };

    async fn run(graph: &InMemoryGraph, query: &CypherQuery) -> AssetGraphResult<Vec<Row>> {
        let mut session = graph.open_session().await?;
        let rows = match query.mode() {
            assetgraph_query::AccessMode::Read => session.run_read(query).await,
            assetgraph_query::AccessMode::Write => session.run_write(query).await,
        };
        session.close().await?;
        rows
    }

    async fn seed(graph: &InMemoryGraph, name: &str, price: &str) -> Asset {
        let query = create_asset(&CreateAssetRequest::new(name, price, "10/06/2022 08:00")).unwrap();
        let rows = run(graph, &query).await.unwrap();
        rows[0][0].as_asset().cloned().unwrap()
    }

    fn ids(rows: &[Row]) -> Vec<String> {
        rows.iter()
            .map(|r| r[0].as_asset().map(|a| a.id.clone()).unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_create_then_find_by_id() {
        let graph = InMemoryGraph::new();
        let asset = seed(&graph, "Forklift", "25000.50").await;

        let search = AssetSearch::default().with(SearchField::Id, asset.id.clone());
        let rows = run(&graph, find_assets(&search).unwrap().query()).await.unwrap();
        assert_eq!(rows, vec![vec![GraphValue::Asset(asset)]]);
    }

    #[tokio::test]
    async fn test_stored_price_is_normalized() {
        let graph = InMemoryGraph::new();
        let asset = seed(&graph, "Drill", "1249.990").await;
        assert_eq!(asset.price.to_string(), "1249.99");

        let search = AssetSearch::default().with(SearchField::Id, asset.id.clone());
        let rows = run(&graph, find_assets(&search).unwrap().query()).await.unwrap();
        let found = rows[0][0].as_asset().unwrap();
        assert_eq!(found.price.to_string(), "1249.99");
    }

    #[tokio::test]
    async fn test_find_results_ordered_by_id() {
        let graph = InMemoryGraph::new();
        for name in ["Pump A", "Pump B", "Pump C"] {
            seed(&graph, name, "10").await;
        }
        let search = AssetSearch::default().with(SearchField::Name, "pump");
        let rows = run(&graph, find_assets(&search).unwrap().query()).await.unwrap();
        let found = ids(&rows);
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found.len(), 3);
        assert_eq!(found, sorted);
    }

    #[tokio::test]
    async fn test_price_range() {
        let graph = InMemoryGraph::new();
        seed(&graph, "cheap", "5").await;
        let mid = seed(&graph, "mid", "50.25").await;
        seed(&graph, "dear", "500").await;

        let search = AssetSearch::default()
            .with(SearchField::PriceGreater, "5")
            .with(SearchField::PriceLess, "500");
        let rows = run(&graph, find_assets(&search).unwrap().query()).await.unwrap();
        assert_eq!(ids(&rows), vec![mid.id]);
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let graph = InMemoryGraph::new();
        let a = seed(&graph, "a", "1").await;
        let b = seed(&graph, "b", "1").await;
        let query = create_link(&LinkRequest::new(a.id.clone(), b.id.clone(), "owns")).unwrap();

        let first = run(&graph, &query).await.unwrap();
        let second = run(&graph, &query).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.link_count(), 1);
        assert!(graph.has_link(&Link::new(a.id, b.id, "OWNS")));
    }

    #[tokio::test]
    async fn test_link_to_missing_endpoint_creates_nothing() {
        let graph = InMemoryGraph::new();
        let a = seed(&graph, "a", "1").await;
        let query = create_link(&LinkRequest::new(a.id, "missing", "OWNS")).unwrap();

        assert!(run(&graph, &query).await.unwrap().is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_link_twice() {
        let graph = InMemoryGraph::new();
        let a = seed(&graph, "a", "1").await;
        let b = seed(&graph, "b", "1").await;
        let req = LinkRequest::new(a.id.clone(), b.id.clone(), "OWNS");
        run(&graph, &create_link(&req).unwrap()).await.unwrap();

        let removed = run(&graph, &delete_link(&req).unwrap()).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0][2], GraphValue::Link(Link::new(a.id, b.id, "OWNS")));
        assert!(run(&graph, &delete_link(&req).unwrap()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_only_matches_same_type() {
        let graph = InMemoryGraph::new();
        let a = seed(&graph, "a", "1").await;
        let b = seed(&graph, "b", "1").await;
        run(&graph, &create_link(&LinkRequest::new(a.id.clone(), b.id.clone(), "OWNS")).unwrap())
            .await
            .unwrap();

        let other = delete_link(&LinkRequest::new(a.id, b.id, "USES")).unwrap();
        assert!(run(&graph, &other).await.unwrap().is_empty());
        assert_eq!(graph.link_count(), 1);
    }

    #[tokio::test]
    async fn test_neighbour_lists() {
        let graph = InMemoryGraph::new();
        let hub = seed(&graph, "hub", "1").await;
        let upstream = seed(&graph, "upstream", "1").await;
        let downstream = seed(&graph, "downstream", "1").await;
        for (from, to, rel) in [
            (&upstream, &hub, "FEEDS"),
            (&upstream, &hub, "OWNS"),
            (&hub, &downstream, "FEEDS"),
        ] {
            let req = LinkRequest::new(from.id.clone(), to.id.clone(), rel);
            run(&graph, &create_link(&req).unwrap()).await.unwrap();
        }

        let search = AssetSearch::default()
            .with(SearchField::Id, hub.id.clone())
            .with_links("both");
        let rows = run(&graph, find_assets(&search).unwrap().query()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0][1], GraphValue::List(vec![GraphValue::Asset(upstream)]));
        assert_eq!(rows[0][2], GraphValue::List(vec![GraphValue::Asset(downstream)]));
    }

    #[tokio::test]
    async fn test_lone_asset_has_empty_neighbour_list() {
        let graph = InMemoryGraph::new();
        let lone = seed(&graph, "lone", "1").await;
        let search = AssetSearch::default()
            .with(SearchField::Id, lone.id)
            .with_links("in");
        let rows = run(&graph, find_assets(&search).unwrap().query()).await.unwrap();
        assert_eq!(rows[0][1], GraphValue::List(Vec::new()));
    }

    #[tokio::test]
    async fn test_read_mode_rejects_writes() {
        let graph = InMemoryGraph::new();
        let query = create_asset(&CreateAssetRequest::new("x", "1", "01/01/2020")).unwrap();
        let mut session = graph.open_session().await.unwrap();
        let err = session.run_read(&query).await.unwrap_err();
        session.close().await.unwrap();
        assert!(matches!(
            err,
            assetgraph_core::AssetGraphError::Storage(StorageError::QueryFailed { .. })
        ));
        assert_eq!(graph.asset_count(), 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let graph = InMemoryGraph::new();
        seed(&graph, "a", "1").await;
        graph.clear().unwrap();
        assert_eq!(graph.asset_count(), 0);
    }

    mod props {
        use super::*;
        use assetgraph_test_utils::generators::{arb_asset_name, arb_create_request};
        use proptest::prelude::*;

        fn block_on<F: std::future::Future>(future: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(future)
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn name_search_ignores_case(
                names in prop::collection::vec(arb_asset_name(), 1..6),
                needle in "[a-zA-Z]{1,3}",
            ) {
                let (lower, upper) = block_on(async {
                    let graph = InMemoryGraph::new();
                    for name in &names {
                        seed(&graph, name, "1").await;
                    }
                    let find = |text: String| {
                        let graph = graph.clone();
                        async move {
                            let search = AssetSearch::default().with(SearchField::Name, text);
                            ids(&run(&graph, find_assets(&search).unwrap().query()).await.unwrap())
                        }
                    };
                    (find(needle.to_lowercase()).await, find(needle.to_uppercase()).await)
                });
                prop_assert_eq!(lower, upper);
            }

            #[test]
            fn created_assets_keep_exact_values((req, price, date) in arb_create_request()) {
                let stored = block_on(async {
                    let graph = InMemoryGraph::new();
                    let rows = run(&graph, &create_asset(&req).unwrap()).await.unwrap();
                    let id = rows[0][0].as_asset().map(|a| a.id.clone()).unwrap();
                    graph.get_asset(&id).unwrap()
                });
                prop_assert_eq!(stored.price, price);
                prop_assert_eq!(stored.purchase_date, date);
            }
        }
    }
}

