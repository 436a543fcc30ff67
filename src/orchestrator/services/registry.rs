//! The agent registry.

use crate::agent::domain::AgentStatus;
use crate::agent::ports::Agent;
use crate::envelope::domain::AgentId;
use crate::orchestrator::domain::OrchestratorError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe map from agent id to the registered agent.
///
/// The orchestrator holds a shared reference to each agent; the driver
/// keeps its own. There is no de-registration: agents leave the registry
/// only when the registry itself is dropped.
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<AgentId, Arc<dyn Agent>>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an agent under its own id.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::DuplicateAgent`] when the id is already
    /// taken; the existing registration is left untouched.
    pub fn insert(&self, agent: Arc<dyn Agent>) -> Result<(), OrchestratorError> {
        let id = agent.id().clone();
        let mut agents = self.write_agents();
        if agents.contains_key(&id) {
            return Err(OrchestratorError::DuplicateAgent(id));
        }
        agents.insert(id, agent);
        Ok(())
    }

    /// Looks up an agent by id.
    #[must_use]
    pub fn get(&self, id: &AgentId) -> Option<Arc<dyn Agent>> {
        self.read_agents().get(id).cloned()
    }

    /// Returns whether an agent is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &AgentId) -> bool {
        self.read_agents().contains_key(id)
    }

    /// Returns a point-in-time copy of every registered agent.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn Agent>> {
        self.read_agents().values().cloned().collect()
    }

    /// Returns one live status snapshot per registered agent.
    #[must_use]
    pub fn statuses(&self) -> Vec<AgentStatus> {
        self.read_agents()
            .values()
            .map(|agent| agent.status())
            .collect()
    }

    /// Returns the number of registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_agents().len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_agents().is_empty()
    }

    fn read_agents(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<AgentId, Arc<dyn Agent>>> {
        self.agents.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_agents(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<AgentId, Arc<dyn Agent>>> {
        self.agents.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<AgentId> = self.read_agents().keys().cloned().collect();
        f.debug_struct("AgentRegistry").field("agents", &ids).finish()
    }
}
