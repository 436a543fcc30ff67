//! Observability events emitted by the orchestrator.

use crate::agent::domain::AgentStatus;
use crate::envelope::domain::AgentId;

/// Event emitted for external logging and monitoring.
///
/// Delivered over a broadcast channel obtained from
/// [`crate::orchestrator::services::Orchestrator::subscribe`]; slow
/// subscribers may observe lag, never block the core.
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    /// The orchestrator's loops were started.
    Started,
    /// The orchestrator's loops were stopped and its agents told to stop.
    Stopped,
    /// An agent was added to the registry.
    AgentRegistered {
        /// The registered agent.
        id: AgentId,
    },
    /// An agent reported a status change.
    AgentStatusChanged {
        /// The status snapshot the agent published.
        status: AgentStatus,
    },
    /// A heartbeat observed a healthy agent turning unhealthy.
    AgentUnhealthy {
        /// The affected agent.
        id: AgentId,
    },
    /// A heartbeat observed an unhealthy agent recovering.
    AgentRecovered {
        /// The affected agent.
        id: AgentId,
    },
}
