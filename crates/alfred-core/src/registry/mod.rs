//! Registries for agents and tools.

mod agent;
mod base;
mod tool;

pub use agent::AgentRegistry;
pub use base::{AlreadyRegistered, BaseRegistry, Registerable};
pub use tool::{ToolRegistry, ToolRegistryConfig};
