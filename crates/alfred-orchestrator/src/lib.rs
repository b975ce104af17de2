//! # Alfred Orchestrator
//!
//! Workflow engine, dispatch loop and coordinator facade.
//!
//! Executions are driven by one tokio task each. Steps either run in
//! declaration order or, when any step declares `depends_on`, as a
//! dependency graph with concurrent branches.

pub mod config;
pub mod coordinator;
mod dispatch;
pub mod engine;
mod execution;
pub mod mapping;
pub mod retry;
pub mod selection;
pub mod validation;

pub use config::EngineConfig;
pub use coordinator::{Coordinator, OrchestrationResult, OrchestrationTask};
pub use engine::{RecoveryReport, WorkflowEngine};
pub use mapping::MappingScope;
pub use retry::RetryGraphStore;
pub use selection::{AgentSelector, SelectionPolicy};
pub use validation::validate_definition;
