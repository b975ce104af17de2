//! # Alfred Core
//!
//! Shared registries for the Alfred orchestration engine.
//!
//! ## Components
//!
//! - [`AgentRegistry`] - Agents addressable by id, resolved by capability
//! - [`ToolRegistry`] - Schema-described tools with validated invocation
//!
//! Registries are explicit instances. The coordinator and engine receive them
//! at construction; there is no process-wide registry.

pub mod registry;
pub mod schema;

pub use registry::{AgentRegistry, ToolRegistry, ToolRegistryConfig};
