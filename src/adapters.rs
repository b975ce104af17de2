//! Conversions from file configuration to runtime types.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};

use alfred_config::{Config, ConfigLoader};
use alfred_orchestrator::{EngineConfig, SelectionPolicy};
use alfred_protocols::RetryPolicy;
use alfred_store::{FileWorkflowStore, MemoryWorkflowStore, WorkflowStore};

/// Get the .alfred directory path.
pub(crate) fn alfred_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".alfred"))
        .unwrap_or_else(|| PathBuf::from(".alfred"))
}

/// Build the engine configuration from the `[engine]` section.
pub(crate) fn engine_config(config: &Config) -> anyhow::Result<EngineConfig> {
    let engine = &config.engine;
    let selection_policy: SelectionPolicy = engine
        .selection_policy
        .parse()
        .map_err(|e: String| anyhow!(e))?;

    Ok(EngineConfig {
        max_concurrent_steps: engine.max_concurrent_steps,
        step_timeout: Duration::from_secs(engine.step_timeout_secs),
        orchestrate_timeout: Duration::from_secs(engine.orchestrate_timeout_secs),
        default_retry: RetryPolicy {
            max_attempts: engine.retry.max_attempts,
            base_delay_ms: engine.retry.base_delay_ms,
            max_delay_ms: engine.retry.max_delay_ms,
            backoff_multiplier: engine.retry.backoff_multiplier,
        },
        selection_policy,
    })
}

/// Open the workflow store selected by `[storage]`.
pub(crate) async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn WorkflowStore>> {
    match config.storage.backend.as_str() {
        "file" => {
            let path = ConfigLoader::expand_path(&config.storage.path);
            let store = FileWorkflowStore::new(&path)
                .await
                .with_context(|| format!("Failed to open workflow store at {}", path))?;
            Ok(Arc::new(store))
        }
        _ => Ok(Arc::new(MemoryWorkflowStore::new())),
    }
}
