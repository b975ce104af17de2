//! Error types for the Alfred protocol layer.

mod agent;
mod knowledge;
mod registry;
mod store;
mod tool;
mod workflow;

pub use agent::*;
pub use knowledge::*;
pub use registry::*;
pub use store::*;
pub use tool::*;
pub use workflow::*;
