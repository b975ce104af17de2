//! Tool registry and invocation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameter for tool '{tool}': {message}")]
    Parameter { tool: String, message: String },

    #[error("Tool '{tool}' failed: {message}")]
    Execution { tool: String, message: String },
}

impl ToolError {
    pub fn parameter(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parameter {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Taxonomy tag for this error.
    pub fn tag(&self) -> super::ErrorTag {
        match self {
            Self::UnknownTool(_) => super::ErrorTag::UnknownTool,
            Self::Parameter { .. } => super::ErrorTag::ToolParameter,
            Self::Execution { .. } => super::ErrorTag::ToolExecution,
        }
    }
}
