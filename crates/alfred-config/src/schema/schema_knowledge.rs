//! Knowledge store configuration.

use serde::{Deserialize, Serialize};

/// Graph knowledge store connection.
///
/// Unset fields fall back to `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD`
/// and `NEO4J_DATABASE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_uri")]
    pub uri: String,

    #[serde(default = "default_graph_username")]
    pub username: String,

    #[serde(default = "default_graph_password")]
    pub password: String,

    #[serde(default = "default_graph_database")]
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            username: default_graph_username(),
            password: default_graph_password(),
            database: default_graph_database(),
        }
    }
}

fn env_or(var: &str, fallback: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
}

fn default_graph_uri() -> String {
    env_or("NEO4J_URI", "bolt://localhost:7687")
}

fn default_graph_username() -> String {
    env_or("NEO4J_USERNAME", "neo4j")
}

fn default_graph_password() -> String {
    env_or("NEO4J_PASSWORD", "")
}

fn default_graph_database() -> String {
    env_or("NEO4J_DATABASE", "neo4j")
}

/// Vector similarity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Embedding dimension every stored vector must match.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Store implementation; only `in_memory` ships.
    #[serde(default = "default_store_type")]
    pub store_type: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            store_type: default_store_type(),
        }
    }
}

fn default_dimension() -> usize {
    1536
}

fn default_store_type() -> String {
    "in_memory".to_string()
}
