//! [`VectorStore`] implementation over [`VectorIndex`].

use async_trait::async_trait;
use tracing::{debug, warn};

use alfred_protocols::{ValueMap, VectorError, VectorMatch, VectorStore};

use crate::index::VectorIndex;

/// Default embedding dimension.
pub const DEFAULT_DIMENSION: usize = 1536;

/// In-memory vector store with a fixed dimension.
pub struct InMemoryVectorStore {
    dimension: usize,
    index: VectorIndex,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            index: VectorIndex::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn add_embedding(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: ValueMap,
    ) -> Result<bool, VectorError> {
        if vector.len() != self.dimension {
            warn!(
                "Rejected embedding '{}': dimension {} != {}",
                id,
                vector.len(),
                self.dimension
            );
            return Ok(false);
        }

        self.index.insert(id.to_string(), vector, metadata);
        debug!("Stored embedding '{}'", id);
        Ok(true)
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, VectorError> {
        if query.len() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        Ok(self
            .index
            .search(query, top_k)
            .into_iter()
            .map(|result| VectorMatch {
                id: result.id,
                score: result.score,
                metadata: result.metadata,
            })
            .collect())
    }

    async fn delete_embedding(&self, id: &str) -> Result<bool, VectorError> {
        Ok(self.index.remove(id).is_some())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
