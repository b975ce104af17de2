//! Common utility types.

use std::collections::HashMap;

/// Unique identifier type.
pub type Id = String;

/// Metadata map type.
pub type Metadata = HashMap<String, serde_json::Value>;

/// JSON object used for step inputs, step outputs and the shared context.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;

/// Generate a prefixed unique identifier, e.g. `exec_6f1c...`.
pub fn generate_id(prefix: &str) -> Id {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
