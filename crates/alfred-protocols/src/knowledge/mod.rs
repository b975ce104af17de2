//! Interfaces to the external knowledge stores.
//!
//! The engine and agents reach the graph and vector stores only through these
//! traits; concrete backends live in extension crates.

mod graph;
mod vector;

pub use graph::*;
pub use vector::*;
