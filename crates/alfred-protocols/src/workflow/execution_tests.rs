use super::*;
use serde_json::json;

#[test]
fn test_status_serialization() {
    assert_eq!(serde_json::to_string(&WorkflowStatus::Pending).unwrap(), "\"pending\"");
    assert_eq!(serde_json::to_string(&WorkflowStatus::Paused).unwrap(), "\"paused\"");
    assert_eq!(WorkflowStatus::Completed.to_string(), "completed");
}

#[test]
fn test_terminal_states() {
    assert!(WorkflowStatus::Completed.is_terminal());
    assert!(WorkflowStatus::Failed.is_terminal());
    assert!(!WorkflowStatus::Running.is_terminal());
    assert!(!WorkflowStatus::Paused.is_terminal());
    assert!(!WorkflowStatus::Pending.is_terminal());
}

#[test]
fn test_transitions() {
    use WorkflowStatus::*;
    assert!(Pending.can_transition_to(Running));
    assert!(Running.can_transition_to(Paused));
    assert!(Paused.can_transition_to(Running));
    assert!(Running.can_transition_to(Completed));
    assert!(Paused.can_transition_to(Failed));

    assert!(!Completed.can_transition_to(Running));
    assert!(!Failed.can_transition_to(Running));
    assert!(!Completed.can_transition_to(Failed));
    assert!(!Paused.can_transition_to(Completed));
    assert!(!Running.can_transition_to(Pending));
}

#[test]
fn test_record_seeds_context_with_input() {
    let mut input = ValueMap::new();
    input.insert("topic".to_string(), json!("quantum computing"));
    let record = ExecutionRecord::new("exec_1", "wf_1", input);

    assert_eq!(record.status, WorkflowStatus::Pending);
    assert_eq!(record.context["topic"], json!("quantum computing"));
    assert_eq!(record.input["topic"], json!("quantum computing"));
    assert!(record.results.is_empty());
}

#[test]
fn test_progress() {
    let mut record = ExecutionRecord::new("exec_1", "wf_1", ValueMap::new());
    assert_eq!(record.progress(4), 0.0);

    record.results.insert("a".to_string(), ValueMap::new());
    assert_eq!(record.progress(4), 0.25);

    record.results.insert("b".to_string(), ValueMap::new());
    record.results.insert("c".to_string(), ValueMap::new());
    record.results.insert("d".to_string(), ValueMap::new());
    assert_eq!(record.progress(4), 1.0);
}

#[test]
fn test_status_report_includes_error() {
    let mut record = ExecutionRecord::new("exec_1", "wf_1", ValueMap::new());
    record.status = WorkflowStatus::Failed;
    record.current_step = Some("step_2".to_string());
    record.results.insert("step_1".to_string(), ValueMap::new());
    record.metadata.error = Some(ErrorRecord {
        tag: ErrorTag::StepExecution,
        step_id: Some("step_2".to_string()),
        message: "boom".to_string(),
        attempts: 3,
    });

    let report = StatusReport::from_record(&record, 3);
    assert_eq!(report.status, WorkflowStatus::Failed);
    assert_eq!(report.current_step.as_deref(), Some("step_2"));
    assert_eq!(report.completed_steps, 1);
    assert!((report.progress - 1.0 / 3.0).abs() < f64::EPSILON);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["error"]["tag"], "StepExecutionError");
    assert_eq!(json["error"]["step_id"], "step_2");
}

#[test]
fn test_not_started_report() {
    let report = StatusReport::not_started("wf_1", 2);
    assert_eq!(report.status, WorkflowStatus::Pending);
    assert!(report.execution_id.is_none());
    assert_eq!(report.progress, 0.0);
}

#[test]
fn test_record_roundtrip_preserves_metadata() {
    let mut record = ExecutionRecord::new("exec_1", "wf_1", ValueMap::new());
    record.metadata.attempts.insert("step_1".to_string(), 2);
    record.metadata.context_writes.push(ContextWrite {
        key: "k".to_string(),
        step_id: "step_1".to_string(),
        sequence: 1,
    });

    let json = serde_json::to_string(&record).unwrap();
    let parsed: ExecutionRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.metadata.attempts["step_1"], 2);
    assert_eq!(parsed.metadata.context_writes.len(), 1);
}
