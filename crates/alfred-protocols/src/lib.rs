//! # Alfred Protocols
//!
//! Core protocol definitions (traits and shared types) for the Alfred
//! orchestration engine. Contains only interface definitions - no
//! implementations.
//!
//! ## Core Traits
//!
//! - [`Agent`] - The agent runtime contract
//! - [`Tool`] - Schema-described callables agents may invoke
//! - [`ToolInvoker`] - Tool access handed to agents
//! - [`GraphStore`] - Graph knowledge store interface
//! - [`VectorStore`] - Vector similarity store interface

pub mod agent;
pub mod error;
pub mod knowledge;
pub mod tool;
pub mod types;
pub mod workflow;

// Re-export core traits
pub use agent::{AbortSignal, Agent, AgentOutcome, AgentTask};
pub use error::{
    AgentError, ErrorTag, GraphError, RegistryError, StoreError, ToolError, VectorError,
    WorkflowError,
};
pub use knowledge::{GraphRow, GraphStore, VectorMatch, VectorStore};
pub use tool::{
    FnTool, ParameterSpec, ParameterType, Tool, ToolCategory, ToolDescriptor, ToolInvoker,
};
pub use types::*;
pub use workflow::{
    ContextWrite, ErrorRecord, ExecutionMetadata, ExecutionRecord, RetryPolicy, StatusReport,
    StepSpec, WorkflowDefinition, WorkflowStatus,
};
