//! Vector index for similarity search.

use parking_lot::RwLock;
use std::collections::HashMap;

use alfred_protocols::ValueMap;

/// A stored vector with its metadata.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub metadata: ValueMap,
}

/// Search result from the index.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub metadata: ValueMap,
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for vectors of different length or with zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Simple in-memory vector index using brute-force search.
pub struct VectorIndex {
    entries: RwLock<HashMap<String, IndexEntry>>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a vector.
    pub fn insert(&self, id: String, vector: Vec<f32>, metadata: ValueMap) {
        self.entries
            .write()
            .insert(id, IndexEntry { vector, metadata });
    }

    pub fn remove(&self, id: &str) -> Option<IndexEntry> {
        self.entries.write().remove(id)
    }

    pub fn get(&self, id: &str) -> Option<IndexEntry> {
        self.entries.read().get(id).cloned()
    }

    /// Up to `limit` entries ordered by descending cosine similarity.
    ///
    /// Equal scores are ordered by id so results are stable.
    pub fn search(&self, query: &[f32], limit: usize) -> Vec<SearchResult> {
        let entries = self.entries.read();
        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|(id, entry)| SearchResult {
                id: id.clone(),
                score: cosine_similarity(query, &entry.vector),
                metadata: entry.metadata.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(limit);
        results
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(label: &str) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("label".to_string(), json!(label));
        map
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_index_insert_and_get() {
        let index = VectorIndex::new();
        index.insert("doc".to_string(), vec![1.0, 0.0, 0.0], meta("first"));

        let entry = index.get("doc").unwrap();
        assert_eq!(entry.vector, vec![1.0, 0.0, 0.0]);
        assert_eq!(entry.metadata["label"], json!("first"));
    }

    #[test]
    fn test_insert_overwrite() {
        let index = VectorIndex::new();
        index.insert("same".to_string(), vec![1.0, 0.0], meta("old"));
        index.insert("same".to_string(), vec![0.0, 1.0], meta("new"));

        assert_eq!(index.len(), 1);
        let entry = index.get("same").unwrap();
        assert_eq!(entry.vector, vec![0.0, 1.0]);
        assert_eq!(entry.metadata["label"], json!("new"));
    }

    #[test]
    fn test_search_sorted_and_limited() {
        let index = VectorIndex::new();
        index.insert("low".to_string(), vec![0.0, 1.0, 0.0], ValueMap::new());
        index.insert("high".to_string(), vec![1.0, 0.0, 0.0], ValueMap::new());
        index.insert("medium".to_string(), vec![0.7, 0.3, 0.0], ValueMap::new());

        let results = index.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "high");
        assert_eq!(results[1].id, "medium");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_search_ties_ordered_by_id() {
        let index = VectorIndex::new();
        for id in ["c", "a", "b"] {
            index.insert(id.to_string(), vec![1.0, 1.0], ValueMap::new());
        }

        let ids: Vec<String> = index.search(&[1.0, 1.0], 10).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let index = VectorIndex::new();
        index.insert("a".to_string(), vec![1.0], ValueMap::new());
        index.insert("b".to_string(), vec![1.0], ValueMap::new());

        assert!(index.remove("a").is_some());
        assert!(index.remove("a").is_none());
        assert_eq!(index.len(), 1);

        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::default();
        assert!(index.search(&[1.0, 0.0], 5).is_empty());
    }
}
