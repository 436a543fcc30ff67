//! Live agent status snapshot.

use super::{AgentState, Health};
use crate::envelope::domain::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time view of an agent's lifecycle state, health, and counters.
///
/// Only the agent itself mutates the underlying state (through its runtime);
/// the orchestrator reads snapshots for observability and heartbeat
/// decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    id: AgentId,
    name: String,
    state: AgentState,
    last_activity: DateTime<Utc>,
    health: Health,
    metrics: BTreeMap<String, u64>,
}

impl AgentStatus {
    /// Creates a status snapshot.
    #[must_use]
    pub const fn new(
        id: AgentId,
        name: String,
        state: AgentState,
        last_activity: DateTime<Utc>,
        health: Health,
        metrics: BTreeMap<String, u64>,
    ) -> Self {
        Self {
            id,
            name,
            state,
            last_activity,
            health,
            metrics,
        }
    }

    /// Returns the agent id.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the agent's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lifecycle state at snapshot time.
    #[must_use]
    pub const fn state(&self) -> AgentState {
        self.state
    }

    /// Returns the last lifecycle or processing activity timestamp.
    #[must_use]
    pub const fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Returns the health at snapshot time.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Returns the counter map at snapshot time.
    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<String, u64> {
        &self.metrics
    }
}
