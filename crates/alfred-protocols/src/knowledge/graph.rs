//! Graph knowledge store protocol.

use async_trait::async_trait;

use crate::error::GraphError;
use crate::types::ValueMap;

/// One row returned by a graph query.
pub type GraphRow = ValueMap;

/// Structured relationship store.
///
/// All operations are potentially failing remote calls.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create a node and return its id.
    async fn create_node(&self, label: &str, properties: ValueMap) -> Result<String, GraphError>;

    /// Create a typed relationship between two existing nodes.
    async fn create_relationship(
        &self,
        source_id: &str,
        target_id: &str,
        relationship_type: &str,
        properties: ValueMap,
    ) -> Result<String, GraphError>;

    /// Run a query with bound parameters.
    async fn query(&self, query: &str, parameters: ValueMap) -> Result<Vec<GraphRow>, GraphError>;
}
