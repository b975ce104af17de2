//! Execution record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ErrorTag;
use crate::types::ValueMap;

/// Status of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Allowed transitions of the execution state machine.
    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Failed)
                | (Running, Paused)
                | (Running, Completed)
                | (Running, Failed)
                | (Paused, Running)
                | (Paused, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error recorded on a failed execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub tag: ErrorTag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,

    pub message: String,

    #[serde(default)]
    pub attempts: u32,
}

/// Audit entry for a write into the shared context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextWrite {
    pub key: String,
    pub step_id: String,
    /// Position of the writing step in completion order.
    pub sequence: u64,
}

/// Timestamps, attempt counters and error records of one execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,

    /// Attempts made per step.
    #[serde(default)]
    pub attempts: BTreeMap<String, u32>,

    /// Step ids in the order their results were committed.
    #[serde(default)]
    pub completion_order: Vec<String>,

    #[serde(default)]
    pub context_writes: Vec<ContextWrite>,
}

impl ExecutionMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            started_at: None,
            updated_at: now,
            finished_at: None,
            error: None,
            attempts: BTreeMap::new(),
            completion_order: Vec::new(),
            context_writes: Vec::new(),
        }
    }
}

impl Default for ExecutionMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Full state of one workflow execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub execution_id: String,
    pub workflow_id: String,
    pub status: WorkflowStatus,

    #[serde(default)]
    pub current_step: Option<String>,

    /// Step id -> step output.
    #[serde(default)]
    pub results: BTreeMap<String, ValueMap>,

    /// Original input data, addressable as `$.input`.
    #[serde(default)]
    pub input: ValueMap,

    #[serde(default)]
    pub context: ValueMap,

    pub metadata: ExecutionMetadata,
}

impl ExecutionRecord {
    pub fn new(
        execution_id: impl Into<String>,
        workflow_id: impl Into<String>,
        input: ValueMap,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            workflow_id: workflow_id.into(),
            status: WorkflowStatus::Pending,
            current_step: None,
            results: BTreeMap::new(),
            context: input.clone(),
            input,
            metadata: ExecutionMetadata::new(),
        }
    }

    /// Completed steps over total steps; an empty workflow counts as done.
    pub fn progress(&self, total_steps: usize) -> f64 {
        if total_steps == 0 {
            return if self.status == WorkflowStatus::Completed { 1.0 } else { 0.0 };
        }
        self.results.len() as f64 / total_steps as f64
    }
}

/// Result of a status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub workflow_id: String,

    /// Absent when the workflow was registered but never executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,

    pub status: WorkflowStatus,
    pub current_step: Option<String>,
    pub progress: f64,
    pub completed_steps: usize,
    pub total_steps: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

impl StatusReport {
    pub fn from_record(record: &ExecutionRecord, total_steps: usize) -> Self {
        Self {
            workflow_id: record.workflow_id.clone(),
            execution_id: Some(record.execution_id.clone()),
            status: record.status,
            current_step: record.current_step.clone(),
            progress: record.progress(total_steps),
            completed_steps: record.results.len(),
            total_steps,
            error: record.metadata.error.clone(),
        }
    }

    /// Report for a definition that has no execution yet.
    pub fn not_started(workflow_id: impl Into<String>, total_steps: usize) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            execution_id: None,
            status: WorkflowStatus::Pending,
            current_step: None,
            progress: 0.0,
            completed_steps: 0,
            total_steps,
            error: None,
        }
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
