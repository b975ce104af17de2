//! Workflow definition and execution record types.

mod definition;
mod execution;
mod retry;

pub use definition::*;
pub use execution::*;
pub use retry::*;
