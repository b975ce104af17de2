//! Workflow engine.
//!
//! Owns registered definitions and the live state of every execution.
//! Each execution is driven by its own dispatch task (see `dispatch`); the
//! methods here only create, signal and read executions.

use std::sync::Arc;
use std::time::Duration;

use alfred_core::{AgentRegistry, ToolRegistry};
use alfred_protocols::{
    ExecutionRecord, StatusReport, ValueMap, WorkflowDefinition, WorkflowError, WorkflowStatus,
    generate_id,
};
use alfred_store::WorkflowStore;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dispatch;
use crate::execution::ExecutionHandle;
use crate::selection::AgentSelector;
use crate::validation::validate_definition;

/// Counts of what [`WorkflowEngine::recover`] restored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub definitions: usize,
    /// Running or pending executions whose dispatch was restarted.
    pub resumed: usize,
    /// Executions restored in the paused state.
    pub paused: usize,
    /// Completed or failed executions restored for status queries.
    pub finished: usize,
}

/// The workflow engine.
pub struct WorkflowEngine {
    pub(crate) agents: Arc<AgentRegistry>,
    pub(crate) tools: Arc<ToolRegistry>,
    store: Option<Arc<dyn WorkflowStore>>,
    pub(crate) config: EngineConfig,
    pub(crate) selector: AgentSelector,
    pub(crate) semaphore: Arc<Semaphore>,
    definitions: DashMap<String, Arc<WorkflowDefinition>>,
    executions: DashMap<String, Arc<ExecutionHandle>>,
    /// workflow_id -> most recently started execution.
    latest: DashMap<String, String>,
}

impl WorkflowEngine {
    /// Create a new engine sharing the given registries.
    pub fn new(agents: Arc<AgentRegistry>, tools: Arc<ToolRegistry>, config: EngineConfig) -> Self {
        Self {
            agents,
            tools,
            store: None,
            selector: AgentSelector::new(config.selection_policy),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_steps.max(1))),
            config,
            definitions: DashMap::new(),
            executions: DashMap::new(),
            latest: DashMap::new(),
        }
    }

    /// Persist definitions and executions through `store`.
    pub fn with_store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn agents(&self) -> &Arc<AgentRegistry> {
        &self.agents
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate and store a definition. Generates an id when none is set.
    pub async fn register_workflow(
        &self,
        mut definition: WorkflowDefinition,
    ) -> Result<String, WorkflowError> {
        if definition.id.trim().is_empty() {
            definition.id = generate_id("wf");
        }
        validate_definition(&definition)?;

        let workflow_id = definition.id.clone();
        let definition = Arc::new(definition);
        match self.definitions.entry(workflow_id.clone()) {
            Entry::Occupied(_) => {
                warn!("Workflow '{}' is already registered", workflow_id);
                return Err(WorkflowError::InvalidDefinition(format!(
                    "id: workflow '{}' is already registered",
                    workflow_id
                )));
            }
            Entry::Vacant(entry) => {
                entry.insert(definition.clone());
            }
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.save_definition(&definition).await {
                warn!(
                    "Failed to persist workflow '{}': {}",
                    workflow_id,
                    WorkflowError::Storage(e)
                );
            }
        }

        info!(
            "Registered workflow '{}' with {} step(s)",
            workflow_id,
            definition.steps.len()
        );
        Ok(workflow_id)
    }

    /// Get a registered definition.
    pub fn get_workflow(&self, workflow_id: &str) -> Option<WorkflowDefinition> {
        self.definitions
            .get(workflow_id)
            .map(|definition| definition.as_ref().clone())
    }

    /// Ids of all registered definitions, sorted.
    pub fn list_workflows(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.definitions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Start a new execution and return its id without waiting for it.
    pub fn execute_workflow(
        self: &Arc<Self>,
        workflow_id: &str,
        input: ValueMap,
    ) -> Result<String, WorkflowError> {
        let definition = self
            .definitions
            .get(workflow_id)
            .map(|definition| definition.clone())
            .ok_or_else(|| WorkflowError::UnknownWorkflow(workflow_id.to_string()))?;

        let execution_id = generate_id("exec");
        let mut record = ExecutionRecord::new(&execution_id, workflow_id, input);
        record.status = WorkflowStatus::Running;
        record.metadata.started_at = Some(Utc::now());

        let handle = Arc::new(ExecutionHandle::new(definition, record));
        self.executions.insert(execution_id.clone(), handle.clone());
        self.latest
            .insert(workflow_id.to_string(), execution_id.clone());

        info!(
            "Started execution '{}' of workflow '{}'",
            execution_id, workflow_id
        );
        self.spawn_dispatch(handle);
        Ok(execution_id)
    }

    fn spawn_dispatch(self: &Arc<Self>, handle: Arc<ExecutionHandle>) {
        let engine = self.clone();
        tokio::spawn(async move {
            dispatch::run_execution(engine, handle).await;
        });
    }

    /// Pause a running execution.
    ///
    /// A step already in flight completes and is recorded; nothing new is
    /// dispatched until [`resume`](Self::resume). Returns `false` when the
    /// execution is not running.
    pub async fn pause(&self, execution_id: &str) -> Result<bool, WorkflowError> {
        let handle = self.handle(execution_id)?;
        if !handle.transition(WorkflowStatus::Paused) {
            debug!(
                "Execution '{}' is {}, not pausing",
                execution_id,
                handle.status()
            );
            return Ok(false);
        }
        info!("Paused execution '{}'", execution_id);
        self.persist(&handle).await;
        Ok(true)
    }

    /// Resume a paused execution. Returns `false` when it is not paused.
    pub async fn resume(&self, execution_id: &str) -> Result<bool, WorkflowError> {
        let handle = self.handle(execution_id)?;
        if handle.status() != WorkflowStatus::Paused
            || handle.cancel.is_cancelled()
            || !handle.transition(WorkflowStatus::Running)
        {
            debug!(
                "Execution '{}' is {}, not resuming",
                execution_id,
                handle.status()
            );
            return Ok(false);
        }
        info!("Resumed execution '{}'", execution_id);
        self.persist(&handle).await;
        Ok(true)
    }

    /// Request cancellation.
    ///
    /// Scheduling stops immediately. The execution becomes FAILED with
    /// `Cancelled` once any in-flight agent call has returned (or timed out);
    /// that call's result is discarded. Returns `false` for a finished
    /// execution.
    pub fn cancel(&self, execution_id: &str) -> Result<bool, WorkflowError> {
        let handle = self.handle(execution_id)?;
        if handle.status().is_terminal() {
            return Ok(false);
        }
        if !handle.cancel.is_cancelled() {
            info!("Cancelling execution '{}'", execution_id);
            handle.cancel.cancel();
            handle.abort.abort();
        }
        Ok(true)
    }

    /// Status by execution id, or by workflow id (latest execution).
    ///
    /// A workflow that was never executed reports PENDING with progress 0.
    pub fn get_workflow_status(&self, id: &str) -> Result<StatusReport, WorkflowError> {
        if let Some(handle) = self.executions.get(id).map(|h| h.clone()) {
            return Ok(handle.report());
        }

        let definition = self
            .definitions
            .get(id)
            .map(|definition| definition.clone())
            .ok_or_else(|| WorkflowError::UnknownWorkflow(id.to_string()))?;

        let latest = self
            .latest
            .get(id)
            .and_then(|execution_id| self.executions.get(execution_id.value()).map(|h| h.clone()));
        Ok(match latest {
            Some(handle) => handle.report(),
            None => StatusReport::not_started(id, definition.steps.len()),
        })
    }

    /// Full snapshot of an execution.
    pub fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, WorkflowError> {
        Ok(self.handle(execution_id)?.snapshot())
    }

    /// Snapshots of every execution of a workflow, oldest first.
    pub fn list_executions(&self, workflow_id: &str) -> Result<Vec<ExecutionRecord>, WorkflowError> {
        if !self.definitions.contains_key(workflow_id) {
            return Err(WorkflowError::UnknownWorkflow(workflow_id.to_string()));
        }

        let handles: Vec<Arc<ExecutionHandle>> = self
            .executions
            .iter()
            .filter(|entry| entry.value().definition.id == workflow_id)
            .map(|entry| entry.value().clone())
            .collect();

        let mut records: Vec<ExecutionRecord> = handles.iter().map(|h| h.snapshot()).collect();
        records.sort_by(|a, b| {
            a.metadata
                .created_at
                .cmp(&b.metadata.created_at)
                .then_with(|| a.execution_id.cmp(&b.execution_id))
        });
        Ok(records)
    }

    /// Wait until the execution is COMPLETED or FAILED.
    pub async fn wait_for_completion(
        &self,
        execution_id: &str,
        timeout: Duration,
    ) -> Result<ExecutionRecord, WorkflowError> {
        let handle = self.handle(execution_id)?;
        let mut status_rx = handle.subscribe();

        match tokio::time::timeout(timeout, status_rx.wait_for(|status| status.is_terminal())).await
        {
            Ok(_) => Ok(handle.snapshot()),
            Err(_) => Err(WorkflowError::Timeout(
                execution_id.to_string(),
                timeout.as_millis() as u64,
            )),
        }
    }

    /// Reload definitions and executions from the store.
    ///
    /// Paused executions come back paused. Running and pending ones resume
    /// from the first step without a recorded result.
    pub async fn recover(self: &Arc<Self>) -> Result<RecoveryReport, WorkflowError> {
        let Some(store) = self.store.clone() else {
            return Ok(RecoveryReport::default());
        };
        let mut report = RecoveryReport::default();

        for definition in store.list_definitions().await? {
            if let Entry::Vacant(entry) = self.definitions.entry(definition.id.clone()) {
                entry.insert(Arc::new(definition));
                report.definitions += 1;
            }
        }

        for mut record in store.list_executions(None).await? {
            if self.executions.contains_key(&record.execution_id) {
                continue;
            }
            let Some(definition) = self
                .definitions
                .get(&record.workflow_id)
                .map(|definition| definition.clone())
            else {
                warn!(
                    "Skipping execution '{}': workflow '{}' is not registered",
                    record.execution_id, record.workflow_id
                );
                continue;
            };

            let spawn = match record.status {
                WorkflowStatus::Completed | WorkflowStatus::Failed => {
                    report.finished += 1;
                    false
                }
                WorkflowStatus::Paused => {
                    report.paused += 1;
                    true
                }
                WorkflowStatus::Running | WorkflowStatus::Pending => {
                    record.status = WorkflowStatus::Running;
                    record
                        .metadata
                        .started_at
                        .get_or_insert_with(Utc::now);
                    report.resumed += 1;
                    true
                }
            };

            let execution_id = record.execution_id.clone();
            self.latest
                .insert(record.workflow_id.clone(), execution_id.clone());
            let handle = Arc::new(ExecutionHandle::new(definition, record));
            self.executions.insert(execution_id, handle.clone());
            if spawn {
                self.spawn_dispatch(handle);
            }
        }

        info!(
            "Recovered {} workflow(s): {} execution(s) resumed, {} paused, {} finished",
            report.definitions, report.resumed, report.paused, report.finished
        );
        Ok(report)
    }

    fn handle(&self, execution_id: &str) -> Result<Arc<ExecutionHandle>, WorkflowError> {
        self.executions
            .get(execution_id)
            .map(|handle| handle.clone())
            .ok_or_else(|| WorkflowError::UnknownWorkflow(execution_id.to_string()))
    }

    /// Write the execution to the store. Failures are logged only.
    pub(crate) async fn persist(&self, handle: &ExecutionHandle) {
        let Some(store) = &self.store else {
            return;
        };

        let _guard = handle.persist_lock.lock().await;
        let snapshot = handle.snapshot();
        if let Err(e) = store.save_execution(&snapshot).await {
            warn!(
                "Failed to persist execution '{}': {}",
                snapshot.execution_id,
                WorkflowError::Storage(e)
            );
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
