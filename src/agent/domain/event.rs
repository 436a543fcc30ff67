//! Lifecycle notifications emitted by an agent runtime.

use super::AgentStatus;
use crate::envelope::domain::AgentId;

/// Notification emitted by an agent for external observers.
///
/// Delivered over an explicit broadcast channel rather than an implicit
/// global emitter; the orchestrator re-emits status changes for its own
/// subscribers.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// The agent transitioned to running.
    Started {
        /// The agent that started.
        id: AgentId,
    },
    /// The agent transitioned back to idle.
    Stopped {
        /// The agent that stopped.
        id: AgentId,
    },
    /// The agent's live status changed.
    StatusChanged(AgentStatus),
}
