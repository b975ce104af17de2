//! Workflow definition validation.

use std::collections::{HashMap, HashSet, VecDeque};

use alfred_protocols::{WorkflowDefinition, WorkflowError};

use crate::mapping::validate_mapping;

/// Check a definition before it is registered.
///
/// Error messages start with the offending field, e.g.
/// `steps[2].capability: ...`.
pub fn validate_definition(definition: &WorkflowDefinition) -> Result<(), WorkflowError> {
    if definition.steps.is_empty() {
        return Err(invalid("steps", "workflow must contain at least one step"));
    }

    let mut seen = HashSet::new();
    for (index, step) in definition.steps.iter().enumerate() {
        if step.id.trim().is_empty() {
            return Err(invalid(format!("steps[{}].id", index), "must not be empty"));
        }
        if !seen.insert(step.id.as_str()) {
            return Err(invalid(
                format!("steps[{}].id", index),
                format!("duplicate step id '{}'", step.id),
            ));
        }
        if !is_valid_capability(&step.capability) {
            return Err(invalid(
                format!("steps[{}].capability", index),
                format!(
                    "'{}' is not a valid capability name (lowercase letters, digits, '_', '.', '-')",
                    step.capability
                ),
            ));
        }
        if let Some(retry) = &step.retry {
            if retry.max_attempts < 1 {
                return Err(invalid(
                    format!("steps[{}].retry.max_attempts", index),
                    "must be at least 1",
                ));
            }
            if retry.backoff_multiplier < 1.0 {
                return Err(invalid(
                    format!("steps[{}].retry.backoff_multiplier", index),
                    "must be >= 1.0",
                ));
            }
        }
        if step.timeout_secs == Some(0) {
            return Err(invalid(
                format!("steps[{}].timeout_secs", index),
                "must be greater than 0",
            ));
        }
    }

    for (index, step) in definition.steps.iter().enumerate() {
        for dependency in &step.depends_on {
            if !seen.contains(dependency.as_str()) {
                return Err(invalid(
                    format!("steps[{}].depends_on", index),
                    format!("unknown step '{}'", dependency),
                ));
            }
        }

        let paths = validate_mapping(&step.input)
            .map_err(|e| invalid(format!("steps[{}].input.{}", index, e.field), e.message))?;
        for path in &paths {
            if let Some(referenced) = path.referenced_step() {
                if !seen.contains(referenced) {
                    return Err(invalid(
                        format!("steps[{}].input", index),
                        format!("references results of unknown step '{}'", referenced),
                    ));
                }
            }
        }
    }

    if let Some(cycle) = find_cycle(definition) {
        return Err(invalid(
            "steps.depends_on",
            format!("dependency cycle among steps: {}", cycle.join(", ")),
        ));
    }

    Ok(())
}

/// `[a-z0-9][a-z0-9_.-]*`
pub fn is_valid_capability(capability: &str) -> bool {
    let mut chars = capability.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    allowed(first) && chars.all(|c| allowed(c) || matches!(c, '_' | '.' | '-'))
}

/// Steps left unsorted by Kahn's algorithm, in definition order.
fn find_cycle(definition: &WorkflowDefinition) -> Option<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = definition
        .steps
        .iter()
        .map(|step| (step.id.as_str(), step.depends_on.len()))
        .collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in &definition.steps {
        for dependency in &step.depends_on {
            dependents
                .entry(dependency.as_str())
                .or_default()
                .push(step.id.as_str());
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut sorted = 0;

    while let Some(id) = queue.pop_front() {
        sorted += 1;
        for &dependent in dependents.get(id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if sorted == definition.steps.len() {
        return None;
    }

    Some(
        definition
            .steps
            .iter()
            .filter(|step| in_degree.get(step.id.as_str()).is_some_and(|d| *d > 0))
            .map(|step| step.id.clone())
            .collect(),
    )
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> WorkflowError {
    WorkflowError::InvalidDefinition(format!("{}: {}", field.into(), message.into()))
}
