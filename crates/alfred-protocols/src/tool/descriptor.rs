//! Tool descriptor types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    DataRetrieval,
    ContentGeneration,
    Analysis,
    Communication,
    Utility,
    Custom,
}

impl Default for ToolCategory {
    fn default() -> Self {
        Self::Utility
    }
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 6] = [
        Self::DataRetrieval,
        Self::ContentGeneration,
        Self::Analysis,
        Self::Communication,
        Self::Utility,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataRetrieval => "data_retrieval",
            Self::ContentGeneration => "content_generation",
            Self::Analysis => "analysis",
            Self::Communication => "communication",
            Self::Utility => "utility",
            Self::Custom => "custom",
        }
    }
}

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Any,
}

/// Schema entry for a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub kind: ParameterType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ParameterSpec {
    /// A required parameter of the given type.
    pub fn required(kind: ParameterType) -> Self {
        Self {
            kind,
            required: true,
            default: None,
            description: String::new(),
        }
    }

    /// An optional parameter without a default.
    pub fn optional(kind: ParameterType) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            description: String::new(),
        }
    }

    /// An optional parameter filled with `default` when absent.
    pub fn with_default(kind: ParameterType, default: serde_json::Value) -> Self {
        Self {
            kind,
            required: false,
            default: Some(default),
            description: String::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Descriptor of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    #[serde(default)]
    pub category: ToolCategory,

    /// Parameter schema keyed by parameter name.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,

    /// Whether invoking the tool needs credentials.
    #[serde(default)]
    pub requires_auth: bool,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: ToolCategory::default(),
            parameters: BTreeMap::new(),
            requires_auth: false,
        }
    }

    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
