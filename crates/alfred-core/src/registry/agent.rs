//! Agent registry.

use std::collections::BTreeSet;
use std::sync::Arc;

use alfred_protocols::{Agent, RegistryError};
use tracing::{info, warn};

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Agent {
    fn registry_id(&self) -> &str {
        self.id()
    }
}

/// Registry of specialized agents, resolved by capability.
///
/// Shared between the coordinator and the engine; the engine consults it at
/// every dispatch point, so agents registered after a workflow starts are
/// visible to the steps that have not yet been dispatched.
pub struct AgentRegistry {
    inner: BaseRegistry<dyn Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Register an agent under its own id.
    pub fn register(&self, agent: Arc<dyn Agent>) -> Result<(), RegistryError> {
        let id = agent.id().to_string();
        let capabilities = agent.capabilities().join(", ");
        match self.inner.register(agent) {
            Ok(()) => {
                info!("Registered agent '{}' [{}]", id, capabilities);
                Ok(())
            }
            Err(existing) => {
                warn!("Agent '{}' is already registered", existing.0);
                Err(RegistryError::DuplicateAgent(existing.0))
            }
        }
    }

    /// Remove an agent. Steps already dispatched to it keep their handle.
    pub fn unregister(&self, agent_id: &str) -> Result<(), RegistryError> {
        self.inner
            .unregister(agent_id)
            .map(|_| info!("Unregistered agent '{}'", agent_id))
            .ok_or_else(|| RegistryError::UnknownAgent(agent_id.to_string()))
    }

    /// Ids of agents declaring `capability`, in registration order.
    pub fn resolve(&self, capability: &str) -> Vec<String> {
        self.resolve_agents(capability)
            .iter()
            .map(|agent| agent.id().to_string())
            .collect()
    }

    /// Agents declaring `capability`, in registration order.
    pub fn resolve_agents(&self, capability: &str) -> Vec<Arc<dyn Agent>> {
        self.inner
            .snapshot()
            .into_iter()
            .filter(|agent| agent.has_capability(capability))
            .collect()
    }

    pub fn lookup(&self, agent_id: &str) -> Result<Arc<dyn Agent>, RegistryError> {
        self.inner
            .get(agent_id)
            .ok_or_else(|| RegistryError::UnknownAgent(agent_id.to_string()))
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.inner.contains(agent_id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.inner.list_ids()
    }

    /// Union of all declared capabilities.
    pub fn capabilities(&self) -> BTreeSet<String> {
        self.inner
            .snapshot()
            .iter()
            .flat_map(|agent| agent.capabilities().iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
