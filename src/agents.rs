//! Built-in demo agents.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use alfred_protocols::{Agent, AgentError, AgentOutcome, AgentTask, ValueMap};

/// Returns its input unchanged and records the last handled step in the
/// context under `last_step`.
pub(crate) struct EchoAgent {
    capabilities: Vec<String>,
}

impl EchoAgent {
    pub fn new() -> Self {
        Self {
            capabilities: vec!["echo".to_string()],
        }
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn id(&self) -> &str {
        "echo"
    }

    fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    async fn process(&self, task: AgentTask) -> Result<AgentOutcome, AgentError> {
        debug!("Echoing {} field(s) for step '{}'", task.input.len(), task.step_id);
        Ok(AgentOutcome::success(task.input).with_context_update("last_step", json!(task.step_id)))
    }
}

/// Invokes one registered tool.
///
/// Input: `tool` (name) and optional `arguments` (object). The tool's return
/// value is produced as `result`.
pub(crate) struct ToolRunnerAgent {
    capabilities: Vec<String>,
}

impl ToolRunnerAgent {
    pub fn new() -> Self {
        Self {
            capabilities: vec!["run_tool".to_string()],
        }
    }
}

#[async_trait]
impl Agent for ToolRunnerAgent {
    fn id(&self) -> &str {
        "tool-runner"
    }

    fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    async fn process(&self, task: AgentTask) -> Result<AgentOutcome, AgentError> {
        let tool = task
            .input
            .get("tool")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::InvalidInput("'tool' must be a string".to_string()))?;
        let arguments = match task.input.get("arguments") {
            None | Some(Value::Null) => ValueMap::new(),
            Some(Value::Object(arguments)) => arguments.clone(),
            Some(_) => {
                return Err(AgentError::InvalidInput(
                    "'arguments' must be an object".to_string(),
                ));
            }
        };
        let tools = task
            .tools
            .as_ref()
            .ok_or_else(|| AgentError::ExecutionFailed("no tool access".to_string()))?;

        let result = tools.invoke(tool, arguments).await?;

        let mut output = ValueMap::new();
        output.insert("tool".to_string(), json!(tool));
        output.insert("result".to_string(), result);
        Ok(AgentOutcome::success(output))
    }
}
