//! End-to-end workflow scenarios through the public engine and coordinator API.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use alfred_core::{AgentRegistry, ToolRegistry};
use alfred_orchestrator::{
    Coordinator, EngineConfig, OrchestrationTask, SelectionPolicy, WorkflowEngine,
};
use alfred_protocols::{
    Agent, AgentError, AgentOutcome, AgentTask, ErrorTag, FnTool, ParameterSpec, ParameterType,
    RetryPolicy, StepSpec, ToolDescriptor, ValueMap, WorkflowDefinition, WorkflowError,
    WorkflowStatus,
};
use alfred_store::{FileWorkflowStore, MemoryWorkflowStore, WorkflowStore};

const WAIT: Duration = Duration::from_secs(10);

// ============================================================================
// Test Helpers
// ============================================================================

type Handler = dyn Fn(&AgentTask) -> Result<AgentOutcome, AgentError> + Send + Sync;

/// Agent whose behaviour is a closure; records every task it receives.
struct ScriptedAgent {
    id: String,
    capabilities: Vec<String>,
    delay: Duration,
    handler: Box<Handler>,
    seen: Mutex<Vec<AgentTask>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedAgent {
    fn new(
        id: &str,
        capabilities: &[&str],
        handler: impl Fn(&AgentTask) -> Result<AgentOutcome, AgentError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            delay: Duration::ZERO,
            handler: Box::new(handler),
            seen: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Agent that succeeds with `{"agent": id, "step": step_id}`.
    fn ok(id: &str, capabilities: &[&str]) -> Self {
        let agent_id = id.to_string();
        Self::new(id, capabilities, move |task| {
            Ok(AgentOutcome::success(map(json!({
                "agent": agent_id,
                "step": task.step_id,
            }))))
        })
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    fn calls_for(&self, step_id: &str) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|task| task.step_id == step_id)
            .count()
    }

    fn inputs(&self) -> Vec<ValueMap> {
        self.seen.lock().iter().map(|task| task.input.clone()).collect()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    async fn process(&self, task: AgentTask) -> Result<AgentOutcome, AgentError> {
        self.seen.lock().push(task.clone());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        (self.handler)(&task)
    }
}

fn map(value: Value) -> ValueMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(max_attempts)
        .with_base_delay(Duration::from_millis(2))
}

fn coordinator() -> Coordinator {
    Coordinator::with_config(EngineConfig {
        default_retry: fast_retry(3),
        ..Default::default()
    })
}

fn sequence(id: &str, capability: &str, steps: usize) -> WorkflowDefinition {
    (1..=steps).fold(WorkflowDefinition::new(id), |definition, index| {
        definition.with_step(StepSpec::new(format!("step_{}", index), capability))
    })
}

// ============================================================================
// Sequential workflows
// ============================================================================

#[tokio::test]
async fn test_all_steps_succeed() {
    let coordinator = coordinator();
    let worker = Arc::new(ScriptedAgent::ok("worker", &["work"]));
    coordinator.register_agent(worker.clone()).unwrap();

    let workflow_id = coordinator
        .create_workflow(sequence("five", "work", 5))
        .await
        .unwrap();
    let execution_id = coordinator.execute(&workflow_id, ValueMap::new()).unwrap();
    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(record.status, WorkflowStatus::Completed);
    assert_eq!(record.results.len(), 5);
    assert_eq!(worker.calls(), 5);

    let report = coordinator.status(&execution_id).unwrap();
    assert_eq!(report.progress, 1.0);
    assert_eq!(report.completed_steps, 5);
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_step_exhausts_retries() {
    let coordinator = coordinator();
    let worker = Arc::new(ScriptedAgent::new("worker", &["work"], |task| {
        if task.step_id == "step_3" {
            Err(AgentError::ExecutionFailed("backend unavailable".to_string()))
        } else {
            Ok(AgentOutcome::success(map(json!({"ok": true}))))
        }
    }));
    coordinator.register_agent(worker.clone()).unwrap();

    let mut definition = sequence("flaky", "work", 4);
    definition.steps[2].retry = Some(fast_retry(3));
    coordinator.create_workflow(definition).await.unwrap();

    let execution_id = coordinator.execute("flaky", ValueMap::new()).unwrap();
    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(record.status, WorkflowStatus::Failed);
    assert_eq!(
        record.results.keys().cloned().collect::<Vec<_>>(),
        vec!["step_1", "step_2"]
    );
    assert_eq!(record.current_step.as_deref(), Some("step_3"));
    assert_eq!(worker.calls_for("step_3"), 3);
    assert_eq!(worker.calls_for("step_4"), 0);

    let report = coordinator.status(&execution_id).unwrap();
    let error = report.error.unwrap();
    assert_eq!(error.tag, ErrorTag::StepExecution);
    assert_eq!(error.step_id.as_deref(), Some("step_3"));
    assert_eq!(error.attempts, 3);
    assert!(error.message.contains("backend unavailable"));
}

#[tokio::test]
async fn test_researcher_scenario() {
    let coordinator = coordinator();
    let researcher = Arc::new(ScriptedAgent::new("researcher", &["research"], |task| {
        let query = task.input["query"].as_str().unwrap_or_default();
        Ok(AgentOutcome::success(map(json!({
            "summary": format!("Findings on {}", query),
        }))))
    }));
    coordinator.register_agent(researcher.clone()).unwrap();

    let definition = WorkflowDefinition::new("research").with_step(
        StepSpec::new("step_1", "research").with_input("query", json!("$.input.topic")),
    );
    coordinator.create_workflow(definition).await.unwrap();

    let execution_id = coordinator
        .execute("research", map(json!({"topic": "quantum computing"})))
        .unwrap();
    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(researcher.inputs(), vec![map(json!({"query": "quantum computing"}))]);
    assert_eq!(record.status, WorkflowStatus::Completed);
    assert_eq!(
        record.results["step_1"],
        map(json!({"summary": "Findings on quantum computing"}))
    );
    assert_eq!(record.input["topic"], json!("quantum computing"));
}

#[tokio::test]
async fn test_synthesize_without_agent() {
    let coordinator = coordinator();
    let researcher = Arc::new(ScriptedAgent::ok("researcher", &["research"]));
    coordinator.register_agent(researcher.clone()).unwrap();

    let definition = WorkflowDefinition::new("report")
        .with_step(StepSpec::new("gather", "research"))
        .with_step(StepSpec::new("combine", "synthesize"));
    coordinator.create_workflow(definition).await.unwrap();

    let execution_id = coordinator.execute("report", ValueMap::new()).unwrap();
    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(record.status, WorkflowStatus::Failed);
    assert_eq!(record.current_step.as_deref(), Some("combine"));
    let error = record.metadata.error.unwrap();
    assert_eq!(error.tag, ErrorTag::AgentUnavailable);
    assert_eq!(error.attempts, 0);
    assert!(!record.metadata.attempts.contains_key("combine"));
    assert_eq!(researcher.calls(), 1);
}

#[tokio::test]
async fn test_unknown_status_is_repeatable() {
    let coordinator = coordinator();
    for _ in 0..3 {
        let err = coordinator.status("does-not-exist").unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownWorkflow(_)));
        assert_eq!(err.tag(), ErrorTag::UnknownWorkflow);
    }
}

#[tokio::test]
async fn test_results_flow_between_steps() {
    let coordinator = coordinator();
    coordinator
        .register_agent(Arc::new(ScriptedAgent::new("fetcher", &["fetch"], |_| {
            Ok(AgentOutcome::success(map(json!({"items": ["a", "b", "c"]})))
                .with_context_update("source", json!("fetcher")))
        })))
        .unwrap();
    let consumer = Arc::new(ScriptedAgent::ok("consumer", &["consume"]));
    coordinator.register_agent(consumer.clone()).unwrap();

    let definition = WorkflowDefinition::new("pipeline")
        .with_step(StepSpec::new("fetch", "fetch"))
        .with_step(
            StepSpec::new("consume", "consume")
                .with_input("second", json!("$.results.fetch.items.1"))
                .with_input("source", json!("$.context.source"))
                .with_input("mode", json!("strict"))
                .with_input("missing", json!("$.input.nothing")),
        );
    coordinator.create_workflow(definition).await.unwrap();

    let execution_id = coordinator.execute("pipeline", ValueMap::new()).unwrap();
    coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(
        consumer.inputs(),
        vec![map(json!({"second": "b", "source": "fetcher", "mode": "strict"}))]
    );
}

#[tokio::test]
async fn test_agent_invokes_tool() {
    let coordinator = coordinator();
    coordinator.register_tool(Arc::new(FnTool::new(
        ToolDescriptor::new("uppercase", "Uppercase text")
            .with_parameter("text", ParameterSpec::required(ParameterType::String)),
        |args| {
            let text = args.get("text").and_then(Value::as_str).unwrap_or_default();
            Ok(json!(text.to_uppercase()))
        },
    )));

    struct ToolAgent {
        capabilities: Vec<String>,
    }

    #[async_trait]
    impl Agent for ToolAgent {
        fn id(&self) -> &str {
            "tool-agent"
        }

        fn capabilities(&self) -> &[String] {
            &self.capabilities
        }

        async fn process(&self, task: AgentTask) -> Result<AgentOutcome, AgentError> {
            let tools = task
                .tools
                .clone()
                .ok_or_else(|| AgentError::ExecutionFailed("no tools".to_string()))?;
            let shouted = tools.invoke("uppercase", task.input.clone()).await?;
            let missing = tools.invoke("uppercase", ValueMap::new()).await;
            Ok(AgentOutcome::success(map(json!({
                "shouted": shouted,
                "missing_is_parameter_error": matches!(
                    missing.map_err(|e| e.tag()),
                    Err(ErrorTag::ToolParameter)
                ),
            }))))
        }
    }

    coordinator
        .register_agent(Arc::new(ToolAgent {
            capabilities: vec!["shout".to_string()],
        }))
        .unwrap();

    let result = coordinator
        .orchestrate(OrchestrationTask::new("shout", map(json!({"text": "hello"}))))
        .await
        .unwrap();

    assert_eq!(result.status, WorkflowStatus::Completed);
    assert_eq!(result.results["step_1"]["shouted"], json!("HELLO"));
    assert_eq!(result.results["step_1"]["missing_is_parameter_error"], json!(true));
}

// ============================================================================
// Pause, resume, cancel
// ============================================================================

#[tokio::test]
async fn test_pause_mid_dispatch_then_resume() {
    let coordinator = coordinator();
    let worker = Arc::new(
        ScriptedAgent::ok("worker", &["work"]).with_delay(Duration::from_millis(150)),
    );
    coordinator.register_agent(worker.clone()).unwrap();
    coordinator
        .create_workflow(sequence("three", "work", 3))
        .await
        .unwrap();

    let execution_id = coordinator.execute("three", ValueMap::new()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(coordinator.pause(&execution_id).await.unwrap());

    // The in-flight step finishes and is committed; nothing new starts.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let report = coordinator.status(&execution_id).unwrap();
    assert_eq!(report.status, WorkflowStatus::Paused);
    assert_eq!(report.current_step.as_deref(), Some("step_1"));
    assert_eq!(report.completed_steps, 1);
    assert_eq!(worker.calls(), 1);

    assert!(coordinator.resume(&execution_id).await.unwrap());
    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(record.status, WorkflowStatus::Completed);
    for step in ["step_1", "step_2", "step_3"] {
        assert_eq!(worker.calls_for(step), 1, "{} re-executed", step);
    }
}

#[tokio::test]
async fn test_agent_registered_while_paused_serves_next_step() {
    let coordinator = coordinator();
    let worker = Arc::new(
        ScriptedAgent::ok("worker", &["work"]).with_delay(Duration::from_millis(150)),
    );
    coordinator.register_agent(worker.clone()).unwrap();
    coordinator
        .create_workflow(
            WorkflowDefinition::new("late-agent")
                .with_step(StepSpec::new("step_1", "work"))
                .with_step(StepSpec::new("step_2", "later")),
        )
        .await
        .unwrap();

    let execution_id = coordinator.execute("late-agent", ValueMap::new()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(coordinator.pause(&execution_id).await.unwrap());

    // step_1 commits while paused; step_2 has no agent yet but must not fail.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let report = coordinator.status(&execution_id).unwrap();
    assert_eq!(report.status, WorkflowStatus::Paused);
    assert!(report.error.is_none());

    let late = Arc::new(ScriptedAgent::ok("late", &["later"]));
    coordinator.register_agent(late.clone()).unwrap();
    assert!(coordinator.resume(&execution_id).await.unwrap());

    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();
    assert_eq!(record.status, WorkflowStatus::Completed);
    assert_eq!(late.calls_for("step_2"), 1);
    assert_eq!(worker.calls(), 1);
}

#[tokio::test]
async fn test_cancel_discards_in_flight_result() {
    let coordinator = coordinator();
    let worker = Arc::new(
        ScriptedAgent::ok("worker", &["work"]).with_delay(Duration::from_millis(200)),
    );
    coordinator.register_agent(worker.clone()).unwrap();
    coordinator
        .create_workflow(sequence("two", "work", 2))
        .await
        .unwrap();

    let execution_id = coordinator.execute("two", ValueMap::new()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(coordinator.cancel(&execution_id).unwrap());

    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(record.status, WorkflowStatus::Failed);
    assert_eq!(record.metadata.error.unwrap().tag, ErrorTag::Cancelled);
    assert!(record.results.is_empty());
    assert_eq!(worker.calls(), 1);
    assert!(worker.seen.lock()[0].is_aborted());
}

#[tokio::test]
async fn test_cancel_while_paused() {
    let coordinator = coordinator();
    let worker = Arc::new(
        ScriptedAgent::ok("worker", &["work"]).with_delay(Duration::from_millis(50)),
    );
    coordinator.register_agent(worker).unwrap();
    coordinator
        .create_workflow(sequence("two", "work", 2))
        .await
        .unwrap();

    let execution_id = coordinator.execute("two", ValueMap::new()).unwrap();
    assert!(coordinator.pause(&execution_id).await.unwrap());
    assert!(coordinator.cancel(&execution_id).unwrap());

    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();
    assert_eq!(record.status, WorkflowStatus::Failed);
    assert_eq!(record.metadata.error.unwrap().tag, ErrorTag::Cancelled);
}

// ============================================================================
// Graph workflows and selection
// ============================================================================

#[tokio::test]
async fn test_graph_branches_run_concurrently() {
    let coordinator = coordinator();
    coordinator
        .register_agent(Arc::new(ScriptedAgent::new("planner", &["plan"], |_| {
            Ok(AgentOutcome::success(map(json!({"value": 21}))))
        })))
        .unwrap();
    let branch = Arc::new(
        ScriptedAgent::new("brancher", &["branch"], |task| {
            Ok(AgentOutcome::success(ValueMap::new())
                .with_context_update("winner", json!(task.step_id)))
        })
        .with_delay(Duration::from_millis(150)),
    );
    coordinator.register_agent(branch.clone()).unwrap();
    let joiner = Arc::new(ScriptedAgent::ok("joiner", &["join"]));
    coordinator.register_agent(joiner.clone()).unwrap();

    let definition = WorkflowDefinition::new("diamond")
        .with_step(StepSpec::new("plan", "plan"))
        .with_step(StepSpec::new("left", "branch").depends_on("plan"))
        .with_step(StepSpec::new("right", "branch").depends_on("plan"))
        .with_step(
            StepSpec::new("join", "join")
                .depends_on("left")
                .depends_on("right")
                .with_input("value", json!("$.results.plan.value")),
        );
    coordinator.create_workflow(definition).await.unwrap();

    let execution_id = coordinator.execute("diamond", ValueMap::new()).unwrap();
    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(record.status, WorkflowStatus::Completed);
    assert_eq!(branch.peak.load(Ordering::SeqCst), 2);
    assert_eq!(joiner.inputs(), vec![map(json!({"value": 21}))]);

    let order = &record.metadata.completion_order;
    assert_eq!(order.first().map(String::as_str), Some("plan"));
    assert_eq!(order.last().map(String::as_str), Some("join"));

    // Last writer by completion order wins; every write is audited.
    let writes = &record.metadata.context_writes;
    assert_eq!(writes.len(), 2);
    assert!(writes[0].sequence < writes[1].sequence);
    assert_eq!(record.context["winner"], json!(writes[1].step_id));
}

#[tokio::test]
async fn test_concurrency_limit_applies() {
    let coordinator = Coordinator::with_config(EngineConfig {
        max_concurrent_steps: 1,
        ..Default::default()
    });
    coordinator
        .register_agent(Arc::new(ScriptedAgent::ok("root", &["root"])))
        .unwrap();
    let branch = Arc::new(
        ScriptedAgent::ok("brancher", &["branch"]).with_delay(Duration::from_millis(30)),
    );
    coordinator.register_agent(branch.clone()).unwrap();

    let mut definition = WorkflowDefinition::new("fan").with_step(StepSpec::new("root", "root"));
    for index in 0..4 {
        definition = definition
            .with_step(StepSpec::new(format!("leaf_{}", index), "branch").depends_on("root"));
    }
    coordinator.create_workflow(definition).await.unwrap();

    let execution_id = coordinator.execute("fan", ValueMap::new()).unwrap();
    let record = coordinator
        .engine()
        .wait_for_completion(&execution_id, WAIT)
        .await
        .unwrap();

    assert_eq!(record.status, WorkflowStatus::Completed);
    assert_eq!(branch.calls(), 4);
    assert_eq!(branch.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_selection_policies() {
    for (policy, expected) in [
        (SelectionPolicy::FirstRegistered, ["one", "one", "one", "one"]),
        (SelectionPolicy::RoundRobin, ["one", "two", "one", "two"]),
    ] {
        let coordinator = Coordinator::with_config(EngineConfig {
            selection_policy: policy,
            ..Default::default()
        });
        coordinator
            .register_agent(Arc::new(ScriptedAgent::ok("one", &["work"])))
            .unwrap();
        coordinator
            .register_agent(Arc::new(ScriptedAgent::ok("two", &["work"])))
            .unwrap();
        coordinator
            .create_workflow(sequence("four", "work", 4))
            .await
            .unwrap();

        let execution_id = coordinator.execute("four", ValueMap::new()).unwrap();
        let record = coordinator
            .engine()
            .wait_for_completion(&execution_id, WAIT)
            .await
            .unwrap();

        let agents: Vec<String> = (1..=4)
            .map(|index| {
                record.results[&format!("step_{}", index)]["agent"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        assert_eq!(agents, expected, "policy {:?}", policy);
    }
}

// ============================================================================
// Persistence and recovery
// ============================================================================

fn engine_with_store(
    store: Arc<dyn WorkflowStore>,
    agents: Vec<Arc<dyn Agent>>,
) -> Arc<WorkflowEngine> {
    let registry = Arc::new(AgentRegistry::new());
    for agent in agents {
        registry.register(agent).unwrap();
    }
    Arc::new(
        WorkflowEngine::new(registry, Arc::new(ToolRegistry::new()), EngineConfig::default())
            .with_store(store),
    )
}

#[tokio::test]
async fn test_recover_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let worker = Arc::new(
        ScriptedAgent::ok("worker", &["work"]).with_delay(Duration::from_millis(150)),
    );

    let execution_id = {
        let store = Arc::new(FileWorkflowStore::new(dir.path()).await.unwrap());
        let engine = engine_with_store(store, vec![worker.clone()]);
        engine.register_workflow(sequence("durable", "work", 3)).await.unwrap();

        let execution_id = engine.execute_workflow("durable", ValueMap::new()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(engine.pause(&execution_id).await.unwrap());
        // Let the in-flight step commit.
        tokio::time::sleep(Duration::from_millis(300)).await;
        execution_id
    };

    let store = Arc::new(FileWorkflowStore::new(dir.path()).await.unwrap());
    let saved = store.load_execution(&execution_id).await.unwrap().unwrap();
    assert_eq!(saved.status, WorkflowStatus::Paused);
    assert_eq!(saved.results.len(), 1);

    let engine = engine_with_store(store, vec![worker.clone()]);
    let report = engine.recover().await.unwrap();
    assert_eq!(report.definitions, 1);
    assert_eq!(report.paused, 1);

    assert!(engine.resume(&execution_id).await.unwrap());
    let record = engine.wait_for_completion(&execution_id, WAIT).await.unwrap();
    assert_eq!(record.status, WorkflowStatus::Completed);
    assert_eq!(worker.calls_for("step_1"), 1);
    assert_eq!(worker.calls_for("step_3"), 1);
}

#[tokio::test]
async fn test_memory_store_lists_history() {
    let store = Arc::new(MemoryWorkflowStore::new());
    let engine = engine_with_store(
        store.clone(),
        vec![Arc::new(ScriptedAgent::ok("worker", &["work"]))],
    );
    engine.register_workflow(sequence("history", "work", 1)).await.unwrap();

    let mut ids = Vec::new();
    for _ in 0..3 {
        let id = engine.execute_workflow("history", ValueMap::new()).unwrap();
        engine.wait_for_completion(&id, WAIT).await.unwrap();
        ids.push(id);
    }

    let stored: Vec<String> = store
        .list_executions(Some("history"))
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.execution_id)
        .collect();
    assert_eq!(stored, ids);

    let statuses: HashMap<String, WorkflowStatus> = engine
        .list_executions("history")
        .unwrap()
        .into_iter()
        .map(|record| (record.execution_id, record.status))
        .collect();
    assert!(statuses.values().all(|status| *status == WorkflowStatus::Completed));
}
