//! Argument validation against a tool's parameter schema.
//!
//! Required parameters must be present and non-null, supplied values must be
//! coercible to the declared type, and missing optional parameters receive
//! their default. Arguments the schema does not mention pass through untouched.

use alfred_protocols::{ParameterType, ToolDescriptor, ToolError, ValueMap};
use serde_json::{Number, Value};

/// Validate and normalize `arguments` for `descriptor`.
pub fn validate_arguments(
    descriptor: &ToolDescriptor,
    mut arguments: ValueMap,
) -> Result<ValueMap, ToolError> {
    for (name, spec) in &descriptor.parameters {
        match arguments.remove(name) {
            None | Some(Value::Null) if spec.required => {
                return Err(ToolError::parameter(
                    &descriptor.name,
                    format!("missing required parameter '{}'", name),
                ));
            }
            None => {
                if let Some(default) = &spec.default {
                    arguments.insert(name.clone(), default.clone());
                }
            }
            Some(Value::Null) => {
                let value = spec.default.clone().unwrap_or(Value::Null);
                arguments.insert(name.clone(), value);
            }
            Some(value) => {
                let coerced = coerce(spec.kind, &value).ok_or_else(|| {
                    ToolError::parameter(
                        &descriptor.name,
                        format!(
                            "parameter '{}' expects {}, got {}",
                            name,
                            type_name(spec.kind),
                            kind_of(&value)
                        ),
                    )
                })?;
                arguments.insert(name.clone(), coerced);
            }
        }
    }

    Ok(arguments)
}

/// Coerce `value` to `kind`, or `None` when it cannot be represented.
pub fn coerce(kind: ParameterType, value: &Value) -> Option<Value> {
    match kind {
        ParameterType::Any => Some(value.clone()),
        ParameterType::String => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        ParameterType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
            Value::Number(n) => n.as_f64().and_then(integral).map(Value::from),
            Value::String(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
                    .map(Value::from)
            }
            _ => None,
        },
        ParameterType::Number => match value {
            Value::Number(_) => Some(value.clone()),
            Value::String(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Some(Value::from(i));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
            _ => None,
        },
        ParameterType::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
            _ => None,
        },
        ParameterType::Array => value.is_array().then(|| value.clone()),
        ParameterType::Object => value.is_object().then(|| value.clone()),
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn type_name(kind: ParameterType) -> &'static str {
    match kind {
        ParameterType::String => "string",
        ParameterType::Integer => "integer",
        ParameterType::Number => "number",
        ParameterType::Boolean => "boolean",
        ParameterType::Array => "array",
        ParameterType::Object => "object",
        ParameterType::Any => "any",
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
