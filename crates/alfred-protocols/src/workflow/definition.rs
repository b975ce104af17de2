//! Workflow definition types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::RetryPolicy;
use crate::types::Metadata;

/// One step of a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step identifier, unique within the definition.
    pub id: String,

    /// Capability an agent must declare to run this step.
    pub capability: String,

    /// Step input field -> mapping expression.
    ///
    /// String values starting with `$.` are paths into the execution
    /// (`$.input.*`, `$.context.*`, `$.results.<step>.*`); any other value is
    /// passed through as a literal.
    #[serde(default)]
    pub input: BTreeMap<String, serde_json::Value>,

    /// Overrides the engine's default retry policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,

    /// Steps whose results must exist before this step dispatches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Per-attempt timeout override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl StepSpec {
    pub fn new(id: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capability: capability.into(),
            input: BTreeMap::new(),
            retry: None,
            depends_on: Vec::new(),
            timeout_secs: None,
        }
    }

    pub fn with_input(mut self, field: impl Into<String>, expression: serde_json::Value) -> Self {
        self.input.insert(field.into(), expression);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn depends_on(mut self, step_id: impl Into<String>) -> Self {
        self.depends_on.push(step_id.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Immutable template for workflow executions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Caller-supplied id; generated on registration when empty.
    #[serde(default, alias = "workflow_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub steps: Vec<StepSpec>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl WorkflowDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            steps: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_step(mut self, step: StepSpec) -> Self {
        self.steps.push(step);
        self
    }

    /// Whether any step declares dependencies.
    ///
    /// Definitions without dependencies run strictly in declaration order.
    pub fn is_graph(&self) -> bool {
        self.steps.iter().any(|s| !s.depends_on.is_empty())
    }

    pub fn step(&self, step_id: &str) -> Option<&StepSpec> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }
}
