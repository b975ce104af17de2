//! Coordinator facade.
//!
//! Single entry point for front-ends: owns the registries and the engine,
//! validates definitions, and wraps one-off tasks in an implicit workflow.

use std::collections::BTreeMap;
use std::sync::Arc;

use alfred_core::{AgentRegistry, ToolRegistry};
use alfred_protocols::{
    Agent, ErrorRecord, ExecutionRecord, RegistryError, StatusReport, StepSpec, Tool, ValueMap,
    WorkflowDefinition, WorkflowError, WorkflowStatus, generate_id,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::engine::WorkflowEngine;

/// A single unit of work handed to [`Coordinator::orchestrate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationTask {
    /// Caller label, echoed in the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    pub capability: String,

    #[serde(default)]
    pub input: ValueMap,
}

impl OrchestrationTask {
    pub fn new(capability: impl Into<String>, input: ValueMap) -> Self {
        Self {
            task_id: None,
            capability: capability.into(),
            input,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }
}

/// Terminal outcome of an orchestrated task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    pub workflow_id: String,
    pub execution_id: String,
    pub status: WorkflowStatus,
    pub results: BTreeMap<String, ValueMap>,
    pub context: ValueMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

impl From<ExecutionRecord> for OrchestrationResult {
    fn from(record: ExecutionRecord) -> Self {
        Self {
            task_id: None,
            workflow_id: record.workflow_id,
            execution_id: record.execution_id,
            status: record.status,
            results: record.results,
            context: record.context,
            error: record.metadata.error,
        }
    }
}

/// Coordinates agents, tools and workflow executions.
pub struct Coordinator {
    engine: Arc<WorkflowEngine>,
}

impl Coordinator {
    /// Wrap an existing engine.
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }

    /// Build an engine with fresh registries.
    pub fn with_config(config: EngineConfig) -> Self {
        let engine = WorkflowEngine::new(
            Arc::new(AgentRegistry::new()),
            Arc::new(ToolRegistry::new()),
            config,
        );
        Self::new(Arc::new(engine))
    }

    pub fn engine(&self) -> &Arc<WorkflowEngine> {
        &self.engine
    }

    pub fn agents(&self) -> &Arc<AgentRegistry> {
        self.engine.agents()
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        self.engine.tools()
    }

    pub fn register_agent(&self, agent: Arc<dyn Agent>) -> Result<(), RegistryError> {
        self.engine.agents().register(agent)
    }

    /// Returns `false` when a tool with the same name already exists.
    pub fn register_tool(&self, tool: Arc<dyn Tool>) -> bool {
        self.engine.tools().register(tool)
    }

    /// Validate and register a definition, returning its id.
    pub async fn create_workflow(
        &self,
        definition: WorkflowDefinition,
    ) -> Result<String, WorkflowError> {
        self.engine.register_workflow(definition).await
    }

    pub fn execute(&self, workflow_id: &str, input: ValueMap) -> Result<String, WorkflowError> {
        self.engine.execute_workflow(workflow_id, input)
    }

    pub fn status(&self, id: &str) -> Result<StatusReport, WorkflowError> {
        self.engine.get_workflow_status(id)
    }

    pub fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, WorkflowError> {
        self.engine.get_execution(execution_id)
    }

    pub async fn pause(&self, execution_id: &str) -> Result<bool, WorkflowError> {
        self.engine.pause(execution_id).await
    }

    pub async fn resume(&self, execution_id: &str) -> Result<bool, WorkflowError> {
        self.engine.resume(execution_id).await
    }

    pub fn cancel(&self, execution_id: &str) -> Result<bool, WorkflowError> {
        self.engine.cancel(execution_id)
    }

    /// Run `task` as a single-step workflow and wait for its outcome.
    ///
    /// The step receives the task input as its context and input. A FAILED
    /// execution is returned as `Ok` with its error record; only a timeout is
    /// an `Err`, after the execution has been cancelled.
    pub async fn orchestrate(
        &self,
        task: OrchestrationTask,
    ) -> Result<OrchestrationResult, WorkflowError> {
        let workflow_id = self.implicit_workflow(&task.capability).await?;
        let execution_id = self.engine.execute_workflow(&workflow_id, task.input)?;
        let task_id = task.task_id.unwrap_or_else(|| generate_id("task"));
        info!(
            "Orchestrating task '{}' (capability '{}') as execution '{}'",
            task_id, task.capability, execution_id
        );

        let timeout = self.engine.config().orchestrate_timeout;
        match self.engine.wait_for_completion(&execution_id, timeout).await {
            Ok(record) => {
                let mut result = OrchestrationResult::from(record);
                result.task_id = Some(task_id);
                Ok(result)
            }
            Err(e @ WorkflowError::Timeout(..)) => {
                warn!(
                    "Execution '{}' did not finish within {:?}, cancelling",
                    execution_id, timeout
                );
                self.engine.cancel(&execution_id)?;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Single-step definition shared by every task of one capability.
    async fn implicit_workflow(&self, capability: &str) -> Result<String, WorkflowError> {
        let workflow_id = format!("orchestrate.{}", capability);
        if self.engine.get_workflow(&workflow_id).is_some() {
            return Ok(workflow_id);
        }

        let definition = WorkflowDefinition::new(&workflow_id)
            .with_name(format!("orchestrate:{}", capability))
            .with_step(StepSpec::new("step_1", capability));
        match self.engine.register_workflow(definition).await {
            Ok(workflow_id) => Ok(workflow_id),
            // A concurrent call registered it first.
            Err(_) if self.engine.get_workflow(&workflow_id).is_some() => Ok(workflow_id),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
