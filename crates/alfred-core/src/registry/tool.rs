//! Tool registry for managing available tools.

use std::sync::Arc;
use std::time::Instant;

use alfred_protocols::{Tool, ToolCategory, ToolDescriptor, ToolError, ToolInvoker, ValueMap};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::base::{BaseRegistry, Registerable};
use crate::schema::validate_arguments;

impl Registerable for dyn Tool {
    fn registry_id(&self) -> &str {
        &self.descriptor().name
    }
}

/// Tool registry settings.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistryConfig {
    /// Log argument payloads at debug level.
    pub log_arguments: bool,
}

type AuthPredicate = dyn Fn(&ToolDescriptor) -> bool + Send + Sync;

/// Registry for managing tools.
///
/// Built on `BaseRegistry`; names are unique and a second registration under
/// the same name is refused without replacing the first.
pub struct ToolRegistry {
    inner: BaseRegistry<dyn Tool>,
    config: ToolRegistryConfig,
    authorize: Option<Box<AuthPredicate>>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self::with_config(ToolRegistryConfig::default())
    }

    pub fn with_config(config: ToolRegistryConfig) -> Self {
        Self {
            inner: BaseRegistry::new(),
            config,
            authorize: None,
        }
    }

    /// Gate tools flagged `requires_auth` behind `predicate`.
    pub fn with_authorizer<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ToolDescriptor) -> bool + Send + Sync + 'static,
    {
        self.authorize = Some(Box::new(predicate));
        self
    }

    /// Register a tool. Returns `false` if the name is taken.
    pub fn register(&self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.descriptor().name.clone();
        let category = tool.descriptor().category;
        match self.inner.register(tool) {
            Ok(()) => {
                debug!("Registered tool '{}' in category {}", name, category.as_str());
                true
            }
            Err(existing) => {
                warn!("Tool '{}' is already registered", existing.0);
                false
            }
        }
    }

    /// Get a tool's descriptor by name.
    pub fn resolve(&self, name: &str) -> Result<ToolDescriptor, ToolError> {
        self.inner
            .get(name)
            .map(|tool| tool.descriptor().clone())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.inner.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    /// List all tool descriptors in registration order.
    pub fn list_all(&self) -> Vec<ToolDescriptor> {
        self.inner
            .snapshot()
            .iter()
            .map(|tool| tool.descriptor().clone())
            .collect()
    }

    pub fn list_by_category(&self, category: ToolCategory) -> Vec<ToolDescriptor> {
        self.inner
            .snapshot()
            .iter()
            .map(|tool| tool.descriptor())
            .filter(|descriptor| descriptor.category == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Validate `arguments` and invoke the named tool.
    pub async fn invoke(&self, name: &str, arguments: ValueMap) -> Result<Value, ToolError> {
        let tool = self
            .inner
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let descriptor = tool.descriptor();

        if descriptor.requires_auth && !self.is_authorized(descriptor) {
            warn!("Tool '{}' requires authorization; call refused", name);
            return Err(ToolError::execution(name, "authorization required"));
        }

        if self.config.log_arguments {
            let payload = serde_json::Value::Object(arguments.clone());
            debug!("Tool '{}' arguments: {}", name, payload);
        }

        let started = Instant::now();
        let result = match validate_arguments(descriptor, arguments) {
            Ok(arguments) => tool.call(arguments).await.map_err(|e| match e {
                ToolError::Execution { .. } => e,
                other => ToolError::execution(name, other.to_string()),
            }),
            Err(e) => Err(e),
        };
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(_) => info!("Tool '{}' succeeded in {}ms", name, elapsed_ms),
            Err(e) => warn!("Tool '{}' failed in {}ms: {}", name, elapsed_ms, e),
        }
        result
    }

    fn is_authorized(&self, descriptor: &ToolDescriptor) -> bool {
        self.authorize
            .as_ref()
            .is_none_or(|predicate| predicate(descriptor))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
    async fn invoke(&self, name: &str, arguments: ValueMap) -> Result<Value, ToolError> {
        ToolRegistry::invoke(self, name, arguments).await
    }

    fn descriptor(&self, name: &str) -> Result<ToolDescriptor, ToolError> {
        self.resolve(name)
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
