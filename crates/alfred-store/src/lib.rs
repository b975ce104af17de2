//! # Alfred Store
//!
//! Persistence of workflow definitions and execution records.
//!
//! The engine writes through a [`WorkflowStore`] on every committed
//! transition and reads everything back on recovery.

pub mod file;
pub mod store;

pub use file::FileWorkflowStore;
pub use store::{MemoryWorkflowStore, WorkflowStore};
