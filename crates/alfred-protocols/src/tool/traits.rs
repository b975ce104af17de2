//! Tool trait definition.

use async_trait::async_trait;

use super::ToolDescriptor;
use crate::error::ToolError;
use crate::types::ValueMap;

/// Core trait for tools.
///
/// The descriptor is fixed for the lifetime of the tool; `call` receives
/// arguments that were already validated and defaulted by the registry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool descriptor.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Execute the tool.
    async fn call(&self, arguments: ValueMap) -> Result<serde_json::Value, ToolError>;
}

type ToolFn = dyn Fn(ValueMap) -> Result<serde_json::Value, String> + Send + Sync;

/// Tool backed by a plain synchronous function.
pub struct FnTool {
    descriptor: ToolDescriptor,
    function: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(descriptor: ToolDescriptor, function: F) -> Self
    where
        F: Fn(ValueMap) -> Result<serde_json::Value, String> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            function: Box::new(function),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, arguments: ValueMap) -> Result<serde_json::Value, ToolError> {
        (self.function)(arguments).map_err(|e| ToolError::execution(&self.descriptor.name, e))
    }
}
