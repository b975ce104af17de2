//! Vector similarity store protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VectorError;
use crate::types::ValueMap;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: ValueMap,
}

/// Embedding similarity store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Configured vector dimension.
    fn dimension(&self) -> usize;

    /// Store or replace an embedding. Returns `false` when the vector's
    /// dimension does not match [`VectorStore::dimension`].
    async fn add_embedding(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: ValueMap,
    ) -> Result<bool, VectorError>;

    /// Up to `top_k` matches ordered by descending similarity.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, VectorError>;

    /// Remove an embedding. Returns `false` when the id is unknown.
    async fn delete_embedding(&self, id: &str) -> Result<bool, VectorError>;
}
