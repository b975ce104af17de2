//! Tool invocation access for agents.

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tool::ToolDescriptor;
use crate::types::ValueMap;

/// Handle through which an agent invokes registered tools.
///
/// Implemented by the tool registry; agents receive it inside their task.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Validate `arguments` against the tool's schema and invoke it.
    async fn invoke(&self, name: &str, arguments: ValueMap) -> Result<serde_json::Value, ToolError>;

    /// Look up a tool descriptor by name.
    fn descriptor(&self, name: &str) -> Result<ToolDescriptor, ToolError>;
}
