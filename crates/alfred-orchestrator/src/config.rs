//! Engine configuration.

use std::time::Duration;

use alfred_protocols::RetryPolicy;

use crate::selection::SelectionPolicy;

/// Configuration for the workflow engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum step dispatches running at once across all executions.
    pub max_concurrent_steps: usize,

    /// Per-attempt timeout for steps without their own.
    pub step_timeout: Duration,

    /// How long `orchestrate` waits for its implicit workflow.
    pub orchestrate_timeout: Duration,

    /// Retry policy for steps without their own.
    pub default_retry: RetryPolicy,

    pub selection_policy: SelectionPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_steps: 16,
            step_timeout: Duration::from_secs(300),
            orchestrate_timeout: Duration::from_secs(120),
            default_retry: RetryPolicy::default(),
            selection_policy: SelectionPolicy::FirstRegistered,
        }
    }
}
