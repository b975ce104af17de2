//! Workflow storage trait and in-memory implementation.

use std::collections::HashMap;

use alfred_protocols::{ExecutionRecord, StoreError, WorkflowDefinition};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Persistence for definitions and executions.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Save (or overwrite) a definition keyed by its id.
    async fn save_definition(&self, definition: &WorkflowDefinition) -> Result<(), StoreError>;

    async fn load_definition(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowDefinition>, StoreError>;

    /// All definitions, ordered by id.
    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>, StoreError>;

    /// Save (or overwrite) an execution keyed by its id.
    async fn save_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError>;

    async fn load_execution(
        &self,
        execution_id: &str,
    ) -> Result<Option<ExecutionRecord>, StoreError>;

    /// Executions of one workflow, or of all workflows when `None`, oldest first.
    async fn list_executions(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<ExecutionRecord>, StoreError>;
}

/// In-memory workflow store.
pub struct MemoryWorkflowStore {
    definitions: RwLock<HashMap<String, WorkflowDefinition>>,
    executions: RwLock<HashMap<String, ExecutionRecord>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
            executions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryWorkflowStore {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn sort_executions(records: &mut [ExecutionRecord]) {
    records.sort_by(|a, b| {
        a.metadata
            .created_at
            .cmp(&b.metadata.created_at)
            .then_with(|| a.execution_id.cmp(&b.execution_id))
    });
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn save_definition(&self, definition: &WorkflowDefinition) -> Result<(), StoreError> {
        let mut definitions = self.definitions.write().await;
        definitions.insert(definition.id.clone(), definition.clone());
        Ok(())
    }

    async fn load_definition(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowDefinition>, StoreError> {
        let definitions = self.definitions.read().await;
        Ok(definitions.get(workflow_id).cloned())
    }

    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>, StoreError> {
        let definitions = self.definitions.read().await;
        let mut list: Vec<_> = definitions.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    async fn save_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        let mut executions = self.executions.write().await;
        executions.insert(record.execution_id.clone(), record.clone());
        Ok(())
    }

    async fn load_execution(
        &self,
        execution_id: &str,
    ) -> Result<Option<ExecutionRecord>, StoreError> {
        let executions = self.executions.read().await;
        Ok(executions.get(execution_id).cloned())
    }

    async fn list_executions(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<ExecutionRecord>, StoreError> {
        let executions = self.executions.read().await;
        let mut list: Vec<_> = executions
            .values()
            .filter(|record| workflow_id.is_none_or(|id| record.workflow_id == id))
            .cloned()
            .collect();
        sort_executions(&mut list);
        Ok(list)
    }
}
