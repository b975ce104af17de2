//! In-memory vector similarity store for Alfred.
//!
//! Brute-force cosine search over a fixed-dimension index.

mod index;
mod store;

pub use index::{IndexEntry, SearchResult, VectorIndex, cosine_similarity};
pub use store::{DEFAULT_DIMENSION, InMemoryVectorStore};
