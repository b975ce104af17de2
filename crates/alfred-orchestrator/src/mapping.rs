//! Step input mapping.
//!
//! A mapping assigns each step input field either a literal value or a path
//! expression. Paths start with `$.` and address one of three roots:
//!
//! - `$.input.<key>...` - the data the execution was started with
//! - `$.context.<key>...` - the shared execution context
//! - `$.results.<step_id>.<field>...` - the recorded output of a step
//!
//! Path segments walk objects by key and arrays by index. A path that does
//! not resolve leaves its field out of the step input.

use std::collections::BTreeMap;

use alfred_protocols::ValueMap;
use serde_json::Value;

const PATH_PREFIX: &str = "$.";

/// Root of a path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRoot {
    Input,
    Context,
    Results,
}

/// A parsed `$.`-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    pub root: PathRoot,
    pub segments: Vec<String>,
}

impl PathExpr {
    /// Parse `expression`; `Ok(None)` means it is a literal.
    pub fn parse(expression: &str) -> Result<Option<Self>, String> {
        let Some(rest) = expression.strip_prefix(PATH_PREFIX) else {
            return Ok(None);
        };

        let mut parts = rest.split('.');
        let root = match parts.next() {
            Some("input") => PathRoot::Input,
            Some("context") => PathRoot::Context,
            Some("results") => PathRoot::Results,
            Some(other) => {
                return Err(format!(
                    "unknown root '{}' in '{}', expected input, context or results",
                    other, expression
                ));
            }
            None => return Err(format!("empty path '{}'", expression)),
        };

        let segments: Vec<String> = parts.map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(format!("empty segment in '{}'", expression));
        }
        if root == PathRoot::Results && segments.is_empty() {
            return Err(format!("'{}' must name a step", expression));
        }

        Ok(Some(Self { root, segments }))
    }

    /// Step referenced by a `$.results.<step>` path.
    pub fn referenced_step(&self) -> Option<&str> {
        match self.root {
            PathRoot::Results => self.segments.first().map(String::as_str),
            _ => None,
        }
    }
}

/// A malformed expression and the input field it was assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for MappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for MappingError {}

/// Validate every path expression in a mapping.
pub fn validate_mapping(mapping: &BTreeMap<String, Value>) -> Result<Vec<PathExpr>, MappingError> {
    let mut paths = Vec::new();
    for (field, expression) in mapping {
        if let Value::String(expression) = expression {
            let parsed = PathExpr::parse(expression).map_err(|message| MappingError {
                field: field.clone(),
                message,
            })?;
            if let Some(path) = parsed {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

/// Data a mapping resolves against.
pub struct MappingScope<'a> {
    pub input: &'a ValueMap,
    pub context: &'a ValueMap,
    pub results: &'a BTreeMap<String, ValueMap>,
}

impl MappingScope<'_> {
    /// Build a step input from `mapping`.
    ///
    /// An empty mapping hands the step the whole context.
    pub fn resolve(&self, mapping: &BTreeMap<String, Value>) -> ValueMap {
        if mapping.is_empty() {
            return self.context.clone();
        }

        let mut resolved = ValueMap::new();
        for (field, expression) in mapping {
            let value = match expression {
                Value::String(text) => match PathExpr::parse(text) {
                    Ok(Some(path)) => self.lookup(&path),
                    Ok(None) => Some(expression.clone()),
                    Err(_) => None,
                },
                literal => Some(literal.clone()),
            };
            if let Some(value) = value {
                resolved.insert(field.clone(), value);
            }
        }
        resolved
    }

    /// Resolve a single path.
    pub fn lookup(&self, path: &PathExpr) -> Option<Value> {
        match path.root {
            PathRoot::Input => walk_map(self.input, &path.segments),
            PathRoot::Context => walk_map(self.context, &path.segments),
            PathRoot::Results => {
                let (step, rest) = path.segments.split_first()?;
                walk_map(self.results.get(step)?, rest)
            }
        }
    }
}

fn walk_map(map: &ValueMap, segments: &[String]) -> Option<Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(Value::Object(map.clone()));
    };

    let mut current = map.get(first)?;
    for segment in rest {
        current = match current {
            Value::Object(object) => object.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}
