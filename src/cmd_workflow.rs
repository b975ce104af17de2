//! Workflow and tool subcommands.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::{info, warn};

use alfred_orchestrator::{Coordinator, OrchestrationResult, validate_definition};
use alfred_protocols::{ToolCategory, ValueMap, WorkflowDefinition, WorkflowError, WorkflowStatus};

use crate::register::BUILTIN_CAPABILITIES;

/// Load a definition from a `.yaml`/`.yml` or JSON file.
pub(crate) fn load_definition(path: &Path) -> anyhow::Result<WorkflowDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow file {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let definition = if is_yaml {
        serde_yml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    };
    Ok(definition)
}

/// Parse `--input`; absent means an empty object.
pub(crate) fn parse_input(raw: Option<&str>) -> anyhow::Result<ValueMap> {
    let Some(raw) = raw else {
        return Ok(ValueMap::new());
    };
    match serde_json::from_str::<Value>(raw).context("--input is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("--input must be a JSON object, got {}", other),
    }
}

/// Register (or reuse) the workflow, execute it and print the outcome.
pub(crate) async fn run_workflow(
    coordinator: &Coordinator,
    file: &Path,
    input: Option<&str>,
    wait: Duration,
) -> anyhow::Result<()> {
    let definition = load_definition(file)?;
    let input = parse_input(input)?;

    let existing = coordinator
        .engine()
        .get_workflow(&definition.id)
        .filter(|existing| !definition.id.is_empty() && *existing == definition);
    let workflow_id = match existing {
        Some(existing) => {
            info!("Reusing registered workflow {}", existing.id);
            existing.id
        }
        None => coordinator.create_workflow(definition).await?,
    };

    let execution_id = coordinator.execute(&workflow_id, input)?;
    info!("Started execution {} of workflow {}", execution_id, workflow_id);

    match coordinator
        .engine()
        .wait_for_completion(&execution_id, wait)
        .await
    {
        Ok(record) => {
            let failed = record.status == WorkflowStatus::Failed;
            let result = OrchestrationResult::from(record);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if failed {
                bail!("Workflow {} failed", workflow_id);
            }
            Ok(())
        }
        Err(WorkflowError::Timeout(..)) => {
            let report = coordinator.status(&execution_id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            warn!("Execution {} still running after {:?}", execution_id, wait);
            bail!("Execution {} did not finish within {}s", execution_id, wait.as_secs())
        }
        Err(e) => Err(e.into()),
    }
}

/// Check a workflow file without running it.
pub(crate) fn validate_workflow(file: &Path) -> anyhow::Result<()> {
    let definition = load_definition(file)?;
    validate_definition(&definition)?;

    let label = if definition.name.is_empty() {
        &definition.id
    } else {
        &definition.name
    };
    let mode = if definition.is_graph() { "graph" } else { "sequential" };
    println!(
        "Workflow '{}' is valid: {} step(s), {} mode",
        label,
        definition.steps.len(),
        mode
    );

    for step in &definition.steps {
        if !BUILTIN_CAPABILITIES.contains(&step.capability.as_str()) {
            println!(
                "  note: no built-in agent serves capability '{}' (step '{}')",
                step.capability, step.id
            );
        }
    }
    Ok(())
}

/// List registered tools as a table or JSON.
pub(crate) fn list_tools(
    coordinator: &Coordinator,
    category: Option<&str>,
    format: &str,
) -> anyhow::Result<()> {
    let descriptors = match category {
        Some(name) => {
            let Some(category) = ToolCategory::ALL.iter().find(|c| c.as_str() == name) else {
                let valid: Vec<&str> = ToolCategory::ALL.iter().map(|c| c.as_str()).collect();
                bail!("Unknown category '{}', valid values: {:?}", name, valid);
            };
            coordinator.tools().list_by_category(*category)
        }
        None => coordinator.tools().list_all(),
    };

    if descriptors.is_empty() {
        println!("No tools found.");
        return Ok(());
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&descriptors)?),
        _ => {
            println!("{:<16} {:<20} {:<24} {}", "NAME", "CATEGORY", "PARAMETERS", "DESCRIPTION");
            println!("{}", "-".repeat(90));
            for descriptor in descriptors {
                let parameters: Vec<&str> =
                    descriptor.parameters.keys().map(String::as_str).collect();
                println!(
                    "{:<16} {:<20} {:<24} {}",
                    descriptor.name,
                    descriptor.category.as_str(),
                    parameters.join(","),
                    descriptor.description
                );
            }
        }
    }
    Ok(())
}
