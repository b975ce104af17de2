//! In-memory [`GraphStore`].
//!
//! Query language:
//! - `Label` or `*` returns nodes with that label (or all nodes).
//! - `-[TYPE]->` or `-[*]->` returns relationships of that type (or all).
//!
//! Every entry of `parameters` must equal the matching property for a row to
//! be returned. Rows come back in creation order.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tracing::debug;

use alfred_protocols::{GraphError, GraphRow, GraphStore, ValueMap};

#[derive(Debug, Clone)]
struct Node {
    id: String,
    label: String,
    properties: ValueMap,
}

#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    source: String,
    target: String,
    relationship_type: String,
    properties: ValueMap,
}

#[derive(Default)]
struct Graph {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    next_node: u64,
    next_relationship: u64,
}

impl Graph {
    fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

enum Query<'a> {
    Nodes(Option<&'a str>),
    Relationships(Option<&'a str>),
}

impl<'a> Query<'a> {
    fn parse(query: &'a str) -> Result<Self, GraphError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GraphError::InvalidQuery("query is empty".to_string()));
        }

        if let Some(inner) = query.strip_prefix("-[").and_then(|rest| rest.strip_suffix("]->")) {
            let inner = inner.trim();
            if inner.is_empty() {
                return Err(GraphError::InvalidQuery(format!(
                    "missing relationship type in '{}'",
                    query
                )));
            }
            return Ok(Self::Relationships((inner != "*").then_some(inner)));
        }

        if query == "*" {
            return Ok(Self::Nodes(None));
        }
        if query
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Ok(Self::Nodes(Some(query)));
        }
        Err(GraphError::InvalidQuery(format!(
            "expected a label, '*' or '-[TYPE]->', got '{}'",
            query
        )))
    }
}

fn matches(properties: &ValueMap, filters: &ValueMap) -> bool {
    filters
        .iter()
        .all(|(key, expected)| properties.get(key) == Some(expected))
}

/// Graph store kept entirely in memory.
#[derive(Default)]
pub struct InMemoryGraphStore {
    graph: RwLock<Graph>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.read().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.read().relationships.len()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn create_node(&self, label: &str, properties: ValueMap) -> Result<String, GraphError> {
        if label.trim().is_empty() {
            return Err(GraphError::InvalidQuery("node label is empty".to_string()));
        }

        let mut graph = self.graph.write();
        graph.next_node += 1;
        let id = format!("n{}", graph.next_node);
        graph.nodes.push(Node {
            id: id.clone(),
            label: label.to_string(),
            properties,
        });
        debug!("Created node '{}' ({})", id, label);
        Ok(id)
    }

    async fn create_relationship(
        &self,
        source_id: &str,
        target_id: &str,
        relationship_type: &str,
        properties: ValueMap,
    ) -> Result<String, GraphError> {
        let mut graph = self.graph.write();
        for endpoint in [source_id, target_id] {
            if !graph.has_node(endpoint) {
                return Err(GraphError::NodeNotFound(endpoint.to_string()));
            }
        }

        graph.next_relationship += 1;
        let id = format!("r{}", graph.next_relationship);
        graph.relationships.push(Relationship {
            id: id.clone(),
            source: source_id.to_string(),
            target: target_id.to_string(),
            relationship_type: relationship_type.to_string(),
            properties,
        });
        debug!(
            "Created relationship '{}': {} -[{}]-> {}",
            id, source_id, relationship_type, target_id
        );
        Ok(id)
    }

    async fn query(&self, query: &str, parameters: ValueMap) -> Result<Vec<GraphRow>, GraphError> {
        let graph = self.graph.read();
        let rows = match Query::parse(query)? {
            Query::Nodes(label) => graph
                .nodes
                .iter()
                .filter(|node| label.is_none_or(|label| node.label == label))
                .filter(|node| matches(&node.properties, &parameters))
                .map(|node| {
                    row(json!({
                        "id": node.id,
                        "label": node.label,
                        "properties": node.properties,
                    }))
                })
                .collect(),
            Query::Relationships(kind) => graph
                .relationships
                .iter()
                .filter(|rel| kind.is_none_or(|kind| rel.relationship_type == kind))
                .filter(|rel| matches(&rel.properties, &parameters))
                .map(|rel| {
                    row(json!({
                        "id": rel.id,
                        "type": rel.relationship_type,
                        "source": rel.source,
                        "target": rel.target,
                        "properties": rel.properties,
                    }))
                })
                .collect(),
        };
        Ok(rows)
    }
}

fn row(value: Value) -> GraphRow {
    match value {
        Value::Object(map) => map,
        _ => GraphRow::new(),
    }
}
