//! In-memory graph knowledge store for Alfred.
//!
//! Reference [`GraphStore`](alfred_protocols::GraphStore) backend for tests
//! and local runs. Wrap it in `RetryGraphStore` to get the engine's retry
//! behaviour around a remote backend with the same interface.

mod store;

pub use store::InMemoryGraphStore;
