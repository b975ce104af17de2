//! Workflow engine errors and the error taxonomy tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{RegistryError, StoreError, ToolError};

/// Stable tag identifying the kind of failure.
///
/// Tags are recorded in execution metadata and reported by status queries,
/// so their serialized names never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorTag {
    #[serde(rename = "DuplicateAgentError")]
    DuplicateAgent,
    #[serde(rename = "UnknownAgentError")]
    UnknownAgent,
    #[serde(rename = "AgentUnavailable")]
    AgentUnavailable,
    #[serde(rename = "UnknownWorkflowError")]
    UnknownWorkflow,
    #[serde(rename = "InvalidWorkflowDefinitionError")]
    InvalidWorkflowDefinition,
    #[serde(rename = "UnknownToolError")]
    UnknownTool,
    #[serde(rename = "ToolParameterError")]
    ToolParameter,
    #[serde(rename = "ToolExecutionError")]
    ToolExecution,
    #[serde(rename = "StepExecutionError")]
    StepExecution,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(rename = "Timeout")]
    Timeout,
    #[serde(rename = "StorageError")]
    Storage,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateAgent => "DuplicateAgentError",
            Self::UnknownAgent => "UnknownAgentError",
            Self::AgentUnavailable => "AgentUnavailable",
            Self::UnknownWorkflow => "UnknownWorkflowError",
            Self::InvalidWorkflowDefinition => "InvalidWorkflowDefinitionError",
            Self::UnknownTool => "UnknownToolError",
            Self::ToolParameter => "ToolParameterError",
            Self::ToolExecution => "ToolExecutionError",
            Self::StepExecution => "StepExecutionError",
            Self::Cancelled => "Cancelled",
            Self::Timeout => "Timeout",
            Self::Storage => "StorageError",
        }
    }
}

impl std::fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("No agent available for capability '{capability}' (step '{step_id}')")]
    AgentUnavailable { step_id: String, capability: String },

    #[error("Unknown workflow or execution: {0}")]
    UnknownWorkflow(String),

    #[error("Invalid workflow definition: {0}")]
    InvalidDefinition(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Step '{step_id}' failed after {attempts} attempt(s): {message}")]
    StepExecution {
        step_id: String,
        attempts: u32,
        message: String,
    },

    #[error("Execution was cancelled")]
    Cancelled,

    #[error("'{0}' did not finish within {1} ms")]
    Timeout(String, u64),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl WorkflowError {
    /// Taxonomy tag for this error.
    pub fn tag(&self) -> ErrorTag {
        match self {
            Self::Registry(e) => e.tag(),
            Self::AgentUnavailable { .. } => ErrorTag::AgentUnavailable,
            Self::UnknownWorkflow(_) => ErrorTag::UnknownWorkflow,
            Self::InvalidDefinition(_) => ErrorTag::InvalidWorkflowDefinition,
            Self::Tool(e) => e.tag(),
            Self::StepExecution { .. } => ErrorTag::StepExecution,
            Self::Cancelled => ErrorTag::Cancelled,
            Self::Timeout(..) => ErrorTag::Timeout,
            Self::Storage(_) => ErrorTag::Storage,
        }
    }
}
