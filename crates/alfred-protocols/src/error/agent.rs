//! Agent errors.

use thiserror::Error;

use super::ToolError;

/// Failure raised by an agent while processing a step.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid task input: {0}")]
    InvalidInput(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Agent was aborted")]
    Aborted,

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}
