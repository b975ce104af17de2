//! Live state of one workflow execution.

use std::sync::Arc;

use alfred_protocols::{
    AbortSignal, Agent, ExecutionRecord, StatusReport, WorkflowDefinition, WorkflowStatus,
};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shared handle to an execution.
///
/// The record lock is only ever held for short synchronous sections, so
/// status reads never wait on a dispatch.
pub(crate) struct ExecutionHandle {
    pub definition: Arc<WorkflowDefinition>,
    record: RwLock<ExecutionRecord>,
    status_tx: watch::Sender<WorkflowStatus>,
    pub cancel: CancellationToken,
    pub abort: Arc<AbortSignal>,
    participants: Mutex<Vec<Arc<dyn Agent>>>,
    /// Serializes store writes so snapshots land in order.
    pub persist_lock: tokio::sync::Mutex<()>,
}

impl ExecutionHandle {
    pub fn new(definition: Arc<WorkflowDefinition>, record: ExecutionRecord) -> Self {
        let (status_tx, _) = watch::channel(record.status);
        Self {
            definition,
            record: RwLock::new(record),
            status_tx,
            cancel: CancellationToken::new(),
            abort: Arc::new(AbortSignal::new()),
            participants: Mutex::new(Vec::new()),
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn execution_id(&self) -> String {
        self.record.read().execution_id.clone()
    }

    pub fn status(&self) -> WorkflowStatus {
        self.record.read().status
    }

    pub fn snapshot(&self) -> ExecutionRecord {
        self.record.read().clone()
    }

    pub fn report(&self) -> StatusReport {
        StatusReport::from_record(&*self.record.read(), self.definition.steps.len())
    }

    pub fn read<R>(&self, f: impl FnOnce(&ExecutionRecord) -> R) -> R {
        f(&*self.record.read())
    }

    /// Mutate the record and bump `updated_at`.
    pub fn update<R>(&self, f: impl FnOnce(&mut ExecutionRecord) -> R) -> R {
        let mut record = self.record.write();
        let result = f(&mut *record);
        record.metadata.updated_at = Utc::now();
        result
    }

    /// Mark `step_id` as the current step if the execution is running.
    ///
    /// Checked under the record lock so a concurrent pause or cancel either
    /// happens before (and blocks the dispatch) or after.
    pub fn begin_dispatch(&self, step_id: &str) -> bool {
        let mut record = self.record.write();
        if record.status != WorkflowStatus::Running || self.cancel.is_cancelled() {
            return false;
        }
        record.current_step = Some(step_id.to_string());
        record.metadata.updated_at = Utc::now();
        true
    }

    /// Apply a state machine transition without notifying waiters.
    pub fn apply_transition(&self, next: WorkflowStatus) -> bool {
        let mut record = self.record.write();
        if !record.status.can_transition_to(next) {
            return false;
        }

        let now = Utc::now();
        record.status = next;
        record.metadata.updated_at = now;
        if next == WorkflowStatus::Running && record.metadata.started_at.is_none() {
            record.metadata.started_at = Some(now);
        }
        if next.is_terminal() {
            record.metadata.finished_at = Some(now);
        }
        true
    }

    /// Apply a transition and notify waiters.
    pub fn transition(&self, next: WorkflowStatus) -> bool {
        let applied = self.apply_transition(next);
        if applied {
            self.publish();
        }
        applied
    }

    /// Notify waiters of the current status.
    pub fn publish(&self) {
        self.status_tx.send_replace(self.status());
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowStatus> {
        self.status_tx.subscribe()
    }

    pub fn add_participant(&self, agent: Arc<dyn Agent>) {
        let mut participants = self.participants.lock();
        if !participants.iter().any(|existing| existing.id() == agent.id()) {
            participants.push(agent);
        }
    }

    pub fn participants(&self) -> Vec<Arc<dyn Agent>> {
        self.participants.lock().clone()
    }
}
