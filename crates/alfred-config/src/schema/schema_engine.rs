//! Engine and persistence configuration.

use serde::{Deserialize, Serialize};

/// Workflow engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on step dispatches running at once across all executions.
    #[serde(default = "default_max_concurrent_steps")]
    pub max_concurrent_steps: usize,

    /// Per-attempt timeout for steps that do not set their own.
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,

    #[serde(default = "default_orchestrate_timeout_secs")]
    pub orchestrate_timeout_secs: u64,

    /// `first_registered` or `round_robin`.
    #[serde(default = "default_selection_policy")]
    pub selection_policy: String,

    /// Retry policy for steps that do not set their own.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_steps: default_max_concurrent_steps(),
            step_timeout_secs: default_step_timeout_secs(),
            orchestrate_timeout_secs: default_orchestrate_timeout_secs(),
            selection_policy: default_selection_policy(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_max_concurrent_steps() -> usize {
    16
}

fn default_step_timeout_secs() -> u64 {
    300
}

fn default_orchestrate_timeout_secs() -> u64 {
    120
}

fn default_selection_policy() -> String {
    "first_registered".to_string()
}

/// Default step retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Workflow state persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `file`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Root directory for the `file` backend.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
        }
    }
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

fn default_storage_path() -> String {
    "~/.alfred/state".to_string()
}
