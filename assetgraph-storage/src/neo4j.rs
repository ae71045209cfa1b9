//! Neo4j graph store
//!
//! Sends the builder's text and bound parameters over Bolt through `neo4rs`
//! and decodes result cells by the query's column layout. Each run gets its
//! own explicit transaction: writes commit, reads always roll back.

use assetgraph_core::{
    Asset, AssetGraphResult, Decimal, GraphValue, Link, Row, StorageError, ASSET_LABEL,
};
use assetgraph_query::{Column, ColumnKind, CypherQuery, ParamValue};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use neo4rs::{query, BoltType, ConfigBuilder, Graph, Node, Query, Txn};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::{GraphSession, GraphStore};

fn schema_statements() -> [String; 1] {
    [format!(
        "CREATE CONSTRAINT asset_id_unique IF NOT EXISTS FOR (a:{}) REQUIRE a.id IS UNIQUE",
        ASSET_LABEL
    )]
}

/// Neo4j-backed store. Cheap to clone; the driver pools connections.
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Arc<Graph>,
}

impl Neo4jStore {
    /// Connect and make sure the asset id constraint exists.
    ///
    /// A failed constraint statement is logged, not returned.
    pub async fn connect(config: &GraphConfig) -> AssetGraphResult<Self> {
        let driver_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(connection_err)?;

        let graph = Graph::connect(driver_config).await.map_err(connection_err)?;
        info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");

        let store = Self {
            graph: Arc::new(graph),
        };
        store.init_schema().await;
        Ok(store)
    }

    async fn init_schema(&self) {
        for statement in schema_statements() {
            if let Err(e) = self.graph.run(query(&statement)).await {
                warn!(error = %e, "Schema statement failed; asset ids may not be enforced unique");
            }
        }
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn open_session(&self) -> AssetGraphResult<Box<dyn GraphSession>> {
        Ok(Box::new(Neo4jSession {
            graph: Arc::clone(&self.graph),
        }))
    }
}

/// Session over a shared driver handle.
pub struct Neo4jSession {
    graph: Arc<Graph>,
}

impl Neo4jSession {
    async fn run(&self, query: &CypherQuery, commit: bool) -> AssetGraphResult<Vec<Row>> {
        let mut txn = self.graph.start_txn().await.map_err(connection_err)?;

        match collect_rows(&mut txn, query).await {
            Ok(rows) => {
                if commit {
                    txn.commit().await.map_err(transaction_err)?;
                } else {
                    txn.rollback().await.map_err(transaction_err)?;
                }
                Ok(rows)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Rollback failed after query error");
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl GraphSession for Neo4jSession {
    async fn run_write(&mut self, query: &CypherQuery) -> AssetGraphResult<Vec<Row>> {
        self.run(query, true).await
    }

    async fn run_read(&mut self, query: &CypherQuery) -> AssetGraphResult<Vec<Row>> {
        self.run(query, false).await
    }

    async fn close(self: Box<Self>) -> AssetGraphResult<()> {
        debug!("Neo4j session closed");
        Ok(())
    }
}

// ============================================================================
// ENCODING / DECODING
// ============================================================================

/// Amounts travel as canonical decimal strings, timestamps as LocalDateTime.
fn bolt_value(value: &ParamValue) -> BoltType {
    match value {
        ParamValue::Text(text) => text.clone().into(),
        ParamValue::Amount(amount) => ParamValue::amount_text(amount).into(),
        ParamValue::Timestamp(at) => (*at).into(),
    }
}

fn bolt_query(built: &CypherQuery) -> Query {
    built
        .params()
        .iter()
        .fold(query(built.text()), |q, (name, value)| {
            q.param(name, bolt_value(value))
        })
}

async fn collect_rows(txn: &mut Txn, built: &CypherQuery) -> Result<Vec<Row>, StorageError> {
    let mut stream = txn.execute(bolt_query(built)).await.map_err(query_err)?;
    let mut rows = Vec::new();
    while let Some(row) = stream.next(txn.handle()).await.map_err(query_err)? {
        rows.push(decode_row(&row, built.columns())?);
    }
    Ok(rows)
}

fn decode_row(row: &neo4rs::Row, columns: &[Column]) -> Result<Row, StorageError> {
    columns
        .iter()
        .map(|column| match column.kind {
            ColumnKind::Asset => {
                let node: Node = row.get(column.name).map_err(decode_err(column.name))?;
                node_to_asset(&node, column.name).map(GraphValue::Asset)
            }
            ColumnKind::AssetList => {
                let nodes: Vec<Node> = row.get(column.name).map_err(decode_err(column.name))?;
                nodes
                    .iter()
                    .map(|node| node_to_asset(node, column.name).map(GraphValue::Asset))
                    .collect::<Result<Vec<_>, _>>()
                    .map(GraphValue::List)
            }
            ColumnKind::Link => {
                let link: Link = row.get(column.name).map_err(decode_err(column.name))?;
                Ok(GraphValue::Link(link))
            }
        })
        .collect()
}

fn node_to_asset(node: &Node, column: &str) -> Result<Asset, StorageError> {
    let price: String = node.get("price").map_err(decode_err(column))?;
    Ok(Asset {
        id: node.get("id").map_err(decode_err(column))?,
        name: node.get("name").map_err(decode_err(column))?,
        price: Decimal::from_str(&price)
            .map_err(decode_err(column))?
            .normalize(),
        purchase_date: node
            .get::<NaiveDateTime>("purchaseDate")
            .map_err(decode_err(column))?,
    })
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn connection_err(e: neo4rs::Error) -> StorageError {
    StorageError::ConnectionFailed {
        reason: e.to_string(),
    }
}

fn transaction_err(e: neo4rs::Error) -> StorageError {
    StorageError::TransactionFailed {
        reason: e.to_string(),
    }
}

fn query_err(e: neo4rs::Error) -> StorageError {
    StorageError::QueryFailed {
        reason: e.to_string(),
    }
}

fn decode_err<E: Display>(column: &str) -> impl Fn(E) -> StorageError + '_ {
    move |e| StorageError::DecodeFailed {
        column: column.to_string(),
        reason: e.to_string(),
    }
}
