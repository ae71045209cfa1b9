//! API Configuration Module
//!
//! Bind address and store selection, loaded from environment variables with
//! development defaults.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// Which graph store backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// Neo4j over Bolt, configured by `ASSETGRAPH_NEO4J_*` variables
    #[default]
    Neo4j,
    /// Process-local graph, lost on exit
    Memory,
}

impl StoreKind {
    fn parse(value: &str) -> ApiResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "neo4j" => Ok(StoreKind::Neo4j),
            "memory" | "in-memory" => Ok(StoreKind::Memory),
            other => Err(ApiError::invalid_input(format!(
                "Unknown store kind: {} (expected neo4j or memory)",
                other
            ))),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Backing store.
    pub store: StoreKind,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            store: StoreKind::Neo4j,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ASSETGRAPH_API_BIND`: Interface (default: 0.0.0.0)
    /// - `PORT` or `ASSETGRAPH_API_PORT`: Port (default: 3000)
    /// - `ASSETGRAPH_STORE`: "neo4j" or "memory" (default: neo4j)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT").or_else(|| lookup("ASSETGRAPH_API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };
        let store = match lookup("ASSETGRAPH_STORE") {
            Some(raw) => StoreKind::parse(&raw)?,
            None => defaults.store,
        };

        Ok(Self {
            bind: lookup("ASSETGRAPH_API_BIND").unwrap_or(defaults.bind),
            port,
            store,
        })
    }

    /// Resolve the socket address to bind.
    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}
