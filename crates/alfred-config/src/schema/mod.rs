//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_engine;
mod schema_knowledge;

pub use schema_engine::*;
pub use schema_knowledge::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub vector: VectorConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tool registry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Include argument payloads in invocation logs.
    #[serde(default)]
    pub log_arguments: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files.
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.alfred/logs".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
