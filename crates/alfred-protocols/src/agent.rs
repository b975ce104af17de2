//! Agent runtime contract.
//!
//! Every specialized agent honours the same request/response shape so the
//! engine can dispatch to any of them interchangeably.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AgentError;
use crate::tool::ToolInvoker;
use crate::types::ValueMap;

/// Core trait for agents.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent ID.
    fn id(&self) -> &str;

    /// Capability tags this agent can process.
    fn capabilities(&self) -> &[String];

    /// Process one step attempt.
    async fn process(&self, task: AgentTask) -> Result<AgentOutcome, AgentError>;

    /// Receive context updates committed by the engine after a step.
    async fn update_context(&self, updates: &ValueMap) {
        let _ = updates;
    }

    /// Check whether this agent declares `capability`.
    fn has_capability(&self, capability: &str) -> bool {
        self.capabilities().iter().any(|c| c == capability)
    }
}

/// A single step attempt handed to an agent.
#[derive(Clone)]
pub struct AgentTask {
    pub execution_id: String,
    pub workflow_id: String,
    pub step_id: String,

    /// 1-based attempt number.
    pub attempt: u32,

    /// Step input after applying the input mapping.
    pub input: ValueMap,

    /// Snapshot of the execution context at dispatch time.
    pub context: ValueMap,

    /// Tool access, when the engine was built with a tool registry.
    pub tools: Option<Arc<dyn ToolInvoker>>,

    /// Raised when the execution is cancelled; agents may poll it.
    pub abort_signal: Arc<AbortSignal>,
}

impl AgentTask {
    pub fn new(
        execution_id: impl Into<String>,
        workflow_id: impl Into<String>,
        step_id: impl Into<String>,
        input: ValueMap,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            workflow_id: workflow_id.into(),
            step_id: step_id.into(),
            attempt: 1,
            input,
            context: ValueMap::new(),
            tools: None,
            abort_signal: Arc::new(AbortSignal::new()),
        }
    }

    pub fn with_context(mut self, context: ValueMap) -> Self {
        self.context = context;
        self
    }

    pub fn with_tools(mut self, tools: Arc<dyn ToolInvoker>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn with_abort_signal(mut self, signal: Arc<AbortSignal>) -> Self {
        self.abort_signal = signal;
        self
    }

    /// Get a typed input value.
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.input
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn is_aborted(&self) -> bool {
        self.abort_signal.is_aborted()
    }
}

/// Result of one step attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub success: bool,

    /// Values produced by the step; stored under `results[step_id]`.
    #[serde(default)]
    pub output: ValueMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Keys to publish into the shared execution context.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub context_updates: ValueMap,
}

impl AgentOutcome {
    pub fn success(output: ValueMap) -> Self {
        Self {
            success: true,
            output,
            error: None,
            context_updates: ValueMap::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: ValueMap::new(),
            error: Some(error.into()),
            context_updates: ValueMap::new(),
        }
    }

    /// Publish `key` into the shared context when the step is committed.
    pub fn with_context_update(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context_updates.insert(key.into(), value);
        self
    }
}

/// Signal for cooperative cancellation.
pub struct AbortSignal {
    aborted: AtomicBool,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self {
            aborted: AtomicBool::new(false),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
