//! Built-in tools.
//!
//! Text utilities are plain functions; the knowledge tools wrap the graph
//! and vector stores so workflows can reach them through the tool-runner.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use alfred_protocols::{
    FnTool, GraphStore, ParameterSpec, ParameterType, Tool, ToolCategory, ToolDescriptor,
    ToolError, ValueMap, VectorStore,
};

fn text_arg<'a>(args: &'a ValueMap, name: &str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn object_arg(args: &ValueMap, name: &str) -> ValueMap {
    match args.get(name) {
        Some(Value::Object(map)) => map.clone(),
        _ => ValueMap::new(),
    }
}

/// Text and clock utilities.
pub(crate) fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(FnTool::new(
            ToolDescriptor::new("uppercase", "Convert text to upper case")
                .with_category(ToolCategory::ContentGeneration)
                .with_parameter(
                    "text",
                    ParameterSpec::required(ParameterType::String).describe("Text to convert"),
                ),
            |args| Ok(json!(text_arg(&args, "text").to_uppercase())),
        )),
        Arc::new(FnTool::new(
            ToolDescriptor::new("word_count", "Count the words in a text")
                .with_category(ToolCategory::Analysis)
                .with_parameter("text", ParameterSpec::required(ParameterType::String)),
            |args| Ok(json!(text_arg(&args, "text").split_whitespace().count())),
        )),
        Arc::new(FnTool::new(
            ToolDescriptor::new("timestamp", "Current UTC time")
                .with_category(ToolCategory::Utility)
                .with_parameter(
                    "format",
                    ParameterSpec::with_default(ParameterType::String, json!("rfc3339"))
                        .describe("'rfc3339' or 'unix'"),
                ),
            |args| {
                let now = Utc::now();
                match text_arg(&args, "format") {
                    "rfc3339" => Ok(json!(now.to_rfc3339())),
                    "unix" => Ok(json!(now.timestamp())),
                    other => Err(format!("unsupported format '{}'", other)),
                }
            },
        )),
    ]
}

/// Tools over the knowledge stores.
pub(crate) fn knowledge_tools(
    graph: Arc<dyn GraphStore>,
    vectors: Arc<dyn VectorStore>,
) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GraphAddNodeTool::new(graph.clone())),
        Arc::new(GraphQueryTool::new(graph)),
        Arc::new(VectorAddTool::new(vectors.clone())),
        Arc::new(VectorSearchTool::new(vectors)),
    ]
}

pub(crate) struct GraphAddNodeTool {
    descriptor: ToolDescriptor,
    store: Arc<dyn GraphStore>,
}

impl GraphAddNodeTool {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            descriptor: ToolDescriptor::new("graph_add_node", "Create a node in the knowledge graph")
                .with_category(ToolCategory::DataRetrieval)
                .with_parameter("label", ParameterSpec::required(ParameterType::String))
                .with_parameter(
                    "properties",
                    ParameterSpec::with_default(ParameterType::Object, json!({})),
                ),
            store,
        }
    }
}

#[async_trait]
impl Tool for GraphAddNodeTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, arguments: ValueMap) -> Result<Value, ToolError> {
        let id = self
            .store
            .create_node(text_arg(&arguments, "label"), object_arg(&arguments, "properties"))
            .await
            .map_err(|e| ToolError::execution(&self.descriptor.name, e.to_string()))?;
        Ok(json!({ "id": id }))
    }
}

pub(crate) struct GraphQueryTool {
    descriptor: ToolDescriptor,
    store: Arc<dyn GraphStore>,
}

impl GraphQueryTool {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            descriptor: ToolDescriptor::new("graph_query", "Query the knowledge graph")
                .with_category(ToolCategory::DataRetrieval)
                .with_parameter(
                    "query",
                    ParameterSpec::required(ParameterType::String)
                        .describe("Node label, '*' or '-[TYPE]->'"),
                )
                .with_parameter(
                    "parameters",
                    ParameterSpec::with_default(ParameterType::Object, json!({})),
                ),
            store,
        }
    }
}

#[async_trait]
impl Tool for GraphQueryTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, arguments: ValueMap) -> Result<Value, ToolError> {
        let rows = self
            .store
            .query(text_arg(&arguments, "query"), object_arg(&arguments, "parameters"))
            .await
            .map_err(|e| ToolError::execution(&self.descriptor.name, e.to_string()))?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}

fn vector_arg(tool: &str, args: &ValueMap, name: &str) -> Result<Vec<f32>, ToolError> {
    let items = args
        .get(name)
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::parameter(tool, format!("'{}' must be an array", name)))?;
    items
        .iter()
        .map(|item| {
            item.as_f64()
                .map(|value| value as f32)
                .ok_or_else(|| ToolError::parameter(tool, format!("'{}' must contain numbers", name)))
        })
        .collect()
}

pub(crate) struct VectorAddTool {
    descriptor: ToolDescriptor,
    store: Arc<dyn VectorStore>,
}

impl VectorAddTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            descriptor: ToolDescriptor::new("vector_add", "Store an embedding")
                .with_category(ToolCategory::DataRetrieval)
                .with_parameter("id", ParameterSpec::required(ParameterType::String))
                .with_parameter("vector", ParameterSpec::required(ParameterType::Array))
                .with_parameter(
                    "metadata",
                    ParameterSpec::with_default(ParameterType::Object, json!({})),
                ),
            store,
        }
    }
}

#[async_trait]
impl Tool for VectorAddTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, arguments: ValueMap) -> Result<Value, ToolError> {
        let vector = vector_arg(&self.descriptor.name, &arguments, "vector")?;
        let stored = self
            .store
            .add_embedding(text_arg(&arguments, "id"), vector, object_arg(&arguments, "metadata"))
            .await
            .map_err(|e| ToolError::execution(&self.descriptor.name, e.to_string()))?;
        Ok(json!({ "stored": stored }))
    }
}

pub(crate) struct VectorSearchTool {
    descriptor: ToolDescriptor,
    store: Arc<dyn VectorStore>,
}

impl VectorSearchTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            descriptor: ToolDescriptor::new("vector_search", "Find the most similar embeddings")
                .with_category(ToolCategory::DataRetrieval)
                .with_parameter("vector", ParameterSpec::required(ParameterType::Array))
                .with_parameter(
                    "top_k",
                    ParameterSpec::with_default(ParameterType::Integer, json!(5)),
                ),
            store,
        }
    }
}

#[async_trait]
impl Tool for VectorSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, arguments: ValueMap) -> Result<Value, ToolError> {
        let vector = vector_arg(&self.descriptor.name, &arguments, "vector")?;
        let top_k = arguments.get("top_k").and_then(Value::as_u64).unwrap_or(5) as usize;
        let matches = self
            .store
            .search(&vector, top_k)
            .await
            .map_err(|e| ToolError::execution(&self.descriptor.name, e.to_string()))?;
        serde_json::to_value(matches)
            .map_err(|e| ToolError::execution(&self.descriptor.name, e.to_string()))
    }
}
