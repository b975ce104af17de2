//! Per-execution dispatch loop.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alfred_protocols::{
    Agent, AgentOutcome, AgentTask, ContextWrite, ErrorRecord, ErrorTag, StepSpec, ValueMap,
    WorkflowStatus,
};
use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::engine::WorkflowEngine;
use crate::execution::ExecutionHandle;
use crate::mapping::MappingScope;

/// What a finished step task hands back to the loop.
struct StepReport {
    step_id: String,
    attempts: u32,
    result: Result<AgentOutcome, String>,
}

/// Drive one execution until it reaches a terminal state.
pub(crate) async fn run_execution(engine: Arc<WorkflowEngine>, handle: Arc<ExecutionHandle>) {
    let definition = handle.definition.clone();
    let execution_id = handle.execution_id();
    let graph = definition.is_graph();

    let mut in_flight: JoinSet<StepReport> = JoinSet::new();
    let mut running: HashSet<String> = HashSet::new();
    let mut failure: Option<ErrorRecord> = None;

    debug!(
        "Dispatch loop started for execution '{}' ({} mode)",
        execution_id,
        if graph { "graph" } else { "sequential" }
    );

    loop {
        let mut blocked = false;
        // Capabilities resolve only for dispatches that would proceed; a
        // paused execution may gain its agent before it resumes.
        if failure.is_none()
            && !handle.cancel.is_cancelled()
            && handle.status() == WorkflowStatus::Running
        {
            for step in ready_steps(&handle, graph, &running) {
                let candidates = engine.agents.resolve_agents(&step.capability);
                let Some(agent) = engine.selector.select(&step.capability, candidates) else {
                    if handle.status() != WorkflowStatus::Running {
                        blocked = true;
                        break;
                    }
                    warn!(
                        "No agent for capability '{}' (execution '{}', step '{}')",
                        step.capability, execution_id, step.id
                    );
                    failure = Some(ErrorRecord {
                        tag: ErrorTag::AgentUnavailable,
                        step_id: Some(step.id.clone()),
                        message: format!(
                            "no agent registered for capability '{}'",
                            step.capability
                        ),
                        attempts: 0,
                    });
                    break;
                };

                if !handle.begin_dispatch(&step.id) {
                    blocked = true;
                    break;
                }

                let input = handle.read(|record| {
                    MappingScope {
                        input: &record.input,
                        context: &record.context,
                        results: &record.results,
                    }
                    .resolve(&step.input)
                });
                handle.add_participant(agent.clone());
                engine.persist(&handle).await;

                debug!(
                    "Dispatching step '{}' of execution '{}' to agent '{}'",
                    step.id,
                    execution_id,
                    agent.id()
                );
                running.insert(step.id.clone());
                in_flight.spawn(run_step(
                    engine.clone(),
                    handle.clone(),
                    step.clone(),
                    agent,
                    input,
                ));
            }
        }

        if let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(report) => {
                    running.remove(&report.step_id);
                    match report.result {
                        Ok(outcome) => {
                            if handle.cancel.is_cancelled() {
                                debug!(
                                    "Discarding result of step '{}': execution '{}' was cancelled",
                                    report.step_id, execution_id
                                );
                            } else {
                                commit(&engine, &handle, &report.step_id, outcome).await;
                            }
                        }
                        Err(message) => {
                            if failure.is_none() && !handle.cancel.is_cancelled() {
                                failure = Some(ErrorRecord {
                                    tag: ErrorTag::StepExecution,
                                    step_id: Some(report.step_id),
                                    message,
                                    attempts: report.attempts,
                                });
                            }
                        }
                    }
                }
                Err(join_error) => {
                    error!(
                        "Step task of execution '{}' aborted: {}",
                        execution_id, join_error
                    );
                    if failure.is_none() {
                        failure = Some(ErrorRecord {
                            tag: ErrorTag::StepExecution,
                            step_id: None,
                            message: join_error.to_string(),
                            attempts: 0,
                        });
                    }
                }
            }
            continue;
        }

        // Nothing in flight from here on.
        if handle.cancel.is_cancelled() {
            finalize(
                &engine,
                &handle,
                ErrorRecord {
                    tag: ErrorTag::Cancelled,
                    step_id: handle.read(|record| record.current_step.clone()),
                    message: "execution was cancelled".to_string(),
                    attempts: 0,
                },
            )
            .await;
            return;
        }

        if let Some(record) = failure.take() {
            finalize(&engine, &handle, record).await;
            return;
        }

        match handle.status() {
            WorkflowStatus::Paused => {
                debug!("Execution '{}' is paused, waiting", execution_id);
                let mut status_rx = handle.subscribe();
                tokio::select! {
                    _ = status_rx.wait_for(|status| *status != WorkflowStatus::Paused) => {}
                    _ = handle.cancel.cancelled() => {}
                }
                continue;
            }
            WorkflowStatus::Completed | WorkflowStatus::Failed => return,
            WorkflowStatus::Running | WorkflowStatus::Pending => {}
        }

        if blocked {
            continue;
        }

        let done = handle.read(|record| {
            definition
                .steps
                .iter()
                .all(|step| record.results.contains_key(&step.id))
        });
        if done {
            if complete(&engine, &handle).await {
                return;
            }
            // Paused between the status check and completion.
            continue;
        }

        finalize(
            &engine,
            &handle,
            ErrorRecord {
                tag: ErrorTag::StepExecution,
                step_id: None,
                message: "no runnable steps remain".to_string(),
                attempts: 0,
            },
        )
        .await;
        return;
    }
}

/// Steps that may be dispatched now.
///
/// Sequential definitions run one step at a time in declaration order;
/// graphed definitions run every step whose dependencies have results.
fn ready_steps(handle: &ExecutionHandle, graph: bool, running: &HashSet<String>) -> Vec<StepSpec> {
    handle.read(|record| {
        let steps = &handle.definition.steps;
        if !graph {
            if !running.is_empty() {
                return Vec::new();
            }
            return steps
                .iter()
                .find(|step| !record.results.contains_key(&step.id))
                .cloned()
                .into_iter()
                .collect();
        }

        steps
            .iter()
            .filter(|step| !record.results.contains_key(&step.id) && !running.contains(&step.id))
            .filter(|step| {
                step.depends_on
                    .iter()
                    .all(|dependency| record.results.contains_key(dependency))
            })
            .cloned()
            .collect()
    })
}

/// Run every attempt of one step against a single agent.
async fn run_step(
    engine: Arc<WorkflowEngine>,
    handle: Arc<ExecutionHandle>,
    step: StepSpec,
    agent: Arc<dyn Agent>,
    input: ValueMap,
) -> StepReport {
    let policy = step
        .retry
        .clone()
        .unwrap_or_else(|| engine.config.default_retry.clone());
    let timeout = step
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(engine.config.step_timeout);

    let mut attempt = 0;
    loop {
        attempt += 1;
        handle.update(|record| {
            record.metadata.attempts.insert(step.id.clone(), attempt);
        });

        let result =
            attempt_once(&engine, &handle, &step, &agent, &input, attempt, timeout).await;
        let message = match result {
            Ok(outcome) => {
                return StepReport {
                    step_id: step.id,
                    attempts: attempt,
                    result: Ok(outcome),
                };
            }
            Err(message) => message,
        };

        if handle.cancel.is_cancelled() || !policy.allows_retry(attempt) {
            return StepReport {
                step_id: step.id,
                attempts: attempt,
                result: Err(message),
            };
        }

        let delay = policy.delay_after(attempt);
        warn!(
            "Step '{}' attempt {}/{} failed: {}. Retrying in {:?}",
            step.id, attempt, policy.max_attempts, message, delay
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = handle.cancel.cancelled() => {
                return StepReport { step_id: step.id, attempts: attempt, result: Err(message) };
            }
        }

        if handle.status() == WorkflowStatus::Paused {
            let mut status_rx = handle.subscribe();
            tokio::select! {
                _ = status_rx.wait_for(|status| *status != WorkflowStatus::Paused) => {}
                _ = handle.cancel.cancelled() => {
                    return StepReport { step_id: step.id, attempts: attempt, result: Err(message) };
                }
            }
        }
    }
}

async fn attempt_once(
    engine: &WorkflowEngine,
    handle: &ExecutionHandle,
    step: &StepSpec,
    agent: &Arc<dyn Agent>,
    input: &ValueMap,
    attempt: u32,
    timeout: Duration,
) -> Result<AgentOutcome, String> {
    let _permit = tokio::select! {
        permit = engine.semaphore.clone().acquire_owned() => {
            permit.map_err(|_| "step concurrency limiter was closed".to_string())?
        }
        _ = handle.cancel.cancelled() => return Err("execution was cancelled".to_string()),
    };

    let (execution_id, workflow_id, context) = handle.read(|record| {
        (
            record.execution_id.clone(),
            record.workflow_id.clone(),
            record.context.clone(),
        )
    });
    let task = AgentTask::new(execution_id, workflow_id, step.id.clone(), input.clone())
        .with_context(context)
        .with_tools(engine.tools.clone())
        .with_attempt(attempt)
        .with_abort_signal(handle.abort.clone());

    let start = Instant::now();
    let call = AssertUnwindSafe(agent.process(task)).catch_unwind();
    let result = match tokio::time::timeout(timeout, call).await {
        Err(_) => Err(format!("agent '{}' timed out after {:?}", agent.id(), timeout)),
        Ok(Err(panic)) => Err(format!(
            "agent '{}' panicked: {}",
            agent.id(),
            panic_message(&*panic)
        )),
        Ok(Ok(Err(e))) => Err(e.to_string()),
        Ok(Ok(Ok(outcome))) if outcome.success => Ok(outcome),
        Ok(Ok(Ok(outcome))) => Err(outcome
            .error
            .unwrap_or_else(|| format!("agent '{}' reported failure", agent.id()))),
    };

    debug!(
        "Step '{}' attempt {} finished in {}ms (ok: {})",
        step.id,
        attempt,
        start.elapsed().as_millis(),
        result.is_ok()
    );
    result
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Record a successful step and forward its context delta.
async fn commit(
    engine: &WorkflowEngine,
    handle: &ExecutionHandle,
    step_id: &str,
    outcome: AgentOutcome,
) {
    let AgentOutcome {
        output,
        context_updates,
        ..
    } = outcome;

    handle.update(|record| {
        record.results.insert(step_id.to_string(), output);
        record.metadata.completion_order.push(step_id.to_string());
        let sequence = (record.metadata.completion_order.len() - 1) as u64;
        for (key, value) in &context_updates {
            record.context.insert(key.clone(), value.clone());
            record.metadata.context_writes.push(ContextWrite {
                key: key.clone(),
                step_id: step_id.to_string(),
                sequence,
            });
        }
    });
    info!(
        "Step '{}' of execution '{}' completed",
        step_id,
        handle.execution_id()
    );
    engine.persist(handle).await;

    if !context_updates.is_empty() {
        for agent in handle.participants() {
            agent.update_context(&context_updates).await;
        }
    }
}

async fn complete(engine: &WorkflowEngine, handle: &ExecutionHandle) -> bool {
    if !handle.apply_transition(WorkflowStatus::Completed) {
        return false;
    }
    info!("Execution '{}' completed", handle.execution_id());
    engine.persist(handle).await;
    handle.publish();
    true
}

async fn finalize(engine: &WorkflowEngine, handle: &ExecutionHandle, record: ErrorRecord) {
    error!(
        "Execution '{}' failed [{}]{}: {}",
        handle.execution_id(),
        record.tag,
        record
            .step_id
            .as_deref()
            .map(|step| format!(" at step '{}'", step))
            .unwrap_or_default(),
        record.message
    );

    handle.update(|execution| {
        if let Some(step_id) = &record.step_id {
            execution.current_step = Some(step_id.clone());
        }
        execution.metadata.error = Some(record);
    });
    handle.apply_transition(WorkflowStatus::Failed);
    engine.persist(handle).await;
    handle.publish();
}
