//! Graph store connection settings.

/// Neo4j connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Bolt address, `host:port` or a `neo4j://` / `bolt://` URI
    pub uri: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub database: String,
    /// Maximum pooled connections
    pub max_connections: usize,
    /// Rows fetched per round trip
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "127.0.0.1:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 200,
        }
    }
}

impl GraphConfig {
    /// Create a configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            uri: lookup("ASSETGRAPH_NEO4J_URI").unwrap_or(defaults.uri),
            user: lookup("ASSETGRAPH_NEO4J_USER").unwrap_or(defaults.user),
            password: lookup("ASSETGRAPH_NEO4J_PASSWORD").unwrap_or(defaults.password),
            database: lookup("ASSETGRAPH_NEO4J_DATABASE").unwrap_or(defaults.database),
            max_connections: lookup("ASSETGRAPH_NEO4J_POOL_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            fetch_size: lookup("ASSETGRAPH_NEO4J_FETCH_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fetch_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = GraphConfig::from_lookup(|_| None);
        assert_eq!(config, GraphConfig::default());
        assert_eq!(config.uri, "127.0.0.1:7687");
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn test_reads_overrides() {
        let env: HashMap<&str, &str> = [
            ("ASSETGRAPH_NEO4J_URI", "neo4j://graph:7687"),
            ("ASSETGRAPH_NEO4J_PASSWORD", "secret"),
            ("ASSETGRAPH_NEO4J_POOL_SIZE", "4"),
            ("ASSETGRAPH_NEO4J_FETCH_SIZE", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let config = GraphConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.uri, "neo4j://graph:7687");
        assert_eq!(config.password, "secret");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.fetch_size, 200);
        assert_eq!(config.user, "neo4j");
    }
}
