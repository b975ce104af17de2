//! Agent registry errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Agent already registered: {0}")]
    DuplicateAgent(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
}

impl RegistryError {
    pub fn tag(&self) -> super::ErrorTag {
        match self {
            Self::DuplicateAgent(_) => super::ErrorTag::DuplicateAgent,
            Self::UnknownAgent(_) => super::ErrorTag::UnknownAgent,
        }
    }
}
