//! File system based workflow store.

use std::path::{Path, PathBuf};

use alfred_protocols::{ExecutionRecord, StoreError, WorkflowDefinition};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, warn};

use crate::store::{WorkflowStore, sort_executions};

/// File system based workflow store.
///
/// Records are stored as individual JSON files:
/// ```text
/// {storage_path}/
/// ├── workflows/
/// │   └── {workflow_id}.json
/// └── executions/
///     └── {workflow_id}/
///         └── {execution_id}.json
/// ```
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash never leaves a half-written record behind.
pub struct FileWorkflowStore {
    storage_path: PathBuf,
}

impl FileWorkflowStore {
    /// Create the store, creating its directories if needed.
    pub async fn new(storage_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage_path = storage_path.into();
        fs::create_dir_all(storage_path.join("workflows")).await?;
        fs::create_dir_all(storage_path.join("executions")).await?;

        debug!("FileWorkflowStore initialized at {:?}", storage_path);

        Ok(Self { storage_path })
    }

    fn workflows_dir(&self) -> PathBuf {
        self.storage_path.join("workflows")
    }

    fn executions_dir(&self) -> PathBuf {
        self.storage_path.join("executions")
    }

    fn definition_path(&self, workflow_id: &str) -> PathBuf {
        self.workflows_dir()
            .join(format!("{}.json", encode_id(workflow_id)))
    }

    fn execution_dir(&self, workflow_id: &str) -> PathBuf {
        self.executions_dir().join(encode_id(workflow_id))
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read every `.json` file in `dir`, skipping unreadable ones.
    async fn read_dir_json<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
        if !fs::try_exists(dir).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<T>(&content) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!("Failed to deserialize {:?}: {}", path, e),
                },
                Err(e) => warn!("Failed to read {:?}: {}", path, e),
            }
        }

        Ok(records)
    }

    /// Subdirectories of `executions/`, one per workflow.
    async fn execution_dirs(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut dirs = Vec::new();
        let mut entries = fs::read_dir(self.executions_dir()).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}

/// Encode an id as a file or directory name.
///
/// ASCII alphanumerics and `-` pass through; every other byte, `_` included,
/// becomes `_xx` so distinct ids never share a file.
fn encode_id(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("_{:02x}", byte));
        }
    }
    encoded
}

#[async_trait]
impl WorkflowStore for FileWorkflowStore {
    async fn save_definition(&self, definition: &WorkflowDefinition) -> Result<(), StoreError> {
        let path = self.definition_path(&definition.id);
        Self::write_json(&path, definition).await?;
        debug!("Saved workflow '{}' to {:?}", definition.id, path);
        Ok(())
    }

    async fn load_definition(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowDefinition>, StoreError> {
        Self::read_json(&self.definition_path(workflow_id)).await
    }

    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>, StoreError> {
        let mut definitions: Vec<WorkflowDefinition> =
            Self::read_dir_json(&self.workflows_dir()).await?;
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(definitions)
    }

    async fn save_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        let dir = self.execution_dir(&record.workflow_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}.json", encode_id(&record.execution_id)));
        Self::write_json(&path, record).await?;
        debug!(
            "Saved execution '{}' ({}) to {:?}",
            record.execution_id, record.status, path
        );
        Ok(())
    }

    async fn load_execution(
        &self,
        execution_id: &str,
    ) -> Result<Option<ExecutionRecord>, StoreError> {
        let filename = format!("{}.json", encode_id(execution_id));
        for dir in self.execution_dirs().await? {
            if let Some(record) = Self::read_json::<ExecutionRecord>(&dir.join(&filename)).await? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    async fn list_executions(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<ExecutionRecord>, StoreError> {
        let dirs = match workflow_id {
            Some(id) => vec![self.execution_dir(id)],
            None => self.execution_dirs().await?,
        };

        let mut records = Vec::new();
        for dir in dirs {
            records.extend(Self::read_dir_json::<ExecutionRecord>(&dir).await?);
        }
        sort_executions(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
