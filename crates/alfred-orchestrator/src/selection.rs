//! Agent selection among several agents sharing a capability.

use std::str::FromStr;
use std::sync::Arc;

use alfred_protocols::Agent;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// How a step picks one of the agents resolved for its capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Always the earliest registered agent.
    #[default]
    FirstRegistered,
    /// Rotate through the candidates per capability.
    RoundRobin,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_registered" => Ok(Self::FirstRegistered),
            "round_robin" => Ok(Self::RoundRobin),
            other => Err(format!("unknown selection policy '{}'", other)),
        }
    }
}

/// Applies a [`SelectionPolicy`].
pub struct AgentSelector {
    policy: SelectionPolicy,
    cursors: DashMap<String, usize>,
}

impl AgentSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            cursors: DashMap::new(),
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Pick one of `candidates` (given in registration order).
    pub fn select(
        &self,
        capability: &str,
        candidates: Vec<Arc<dyn Agent>>,
    ) -> Option<Arc<dyn Agent>> {
        if candidates.is_empty() {
            return None;
        }

        let index = match self.policy {
            SelectionPolicy::FirstRegistered => 0,
            SelectionPolicy::RoundRobin => {
                let mut cursor = self.cursors.entry(capability.to_string()).or_insert(0);
                let index = *cursor % candidates.len();
                *cursor = cursor.wrapping_add(1);
                index
            }
        };
        candidates.into_iter().nth(index)
    }
}
