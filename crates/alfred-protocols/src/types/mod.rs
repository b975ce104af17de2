//! Common types used across the Alfred workspace.

mod common;

pub use common::*;
