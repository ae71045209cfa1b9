//! Execution adapter
//!
//! Runs one built query against one fresh session and guarantees the session
//! is closed before the result is handed back.

use assetgraph_core::{AssetGraphResult, Row};
use assetgraph_query::{AccessMode, CypherQuery};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::GraphStore;

/// Executes built queries against an injected store.
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn GraphStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Open a session, run `query` under its access mode, close the session.
    ///
    /// The session is closed on every path. If both the run and the close
    /// fail, the run's error is returned.
    pub async fn execute(&self, query: &CypherQuery) -> AssetGraphResult<Vec<Row>> {
        let mut session = self.store.open_session().await?;

        let outcome = match query.mode() {
            AccessMode::Read => session.run_read(query).await,
            AccessMode::Write => session.run_write(query).await,
        };
        let closed = session.close().await;

        match (outcome, closed) {
            (Ok(rows), Ok(())) => {
                debug!(rows = rows.len(), mode = ?query.mode(), "Query executed");
                Ok(rows)
            }
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(run_err), Ok(())) => Err(run_err),
            (Err(run_err), Err(close_err)) => {
                warn!(error = %close_err, "Session close failed after query error");
                Err(run_err)
            }
        }
    }
}
