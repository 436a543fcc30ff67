//! The agent contract.

use crate::agent::domain::{AgentCapability, AgentError, AgentEvent, AgentKind, AgentMetrics, AgentStatus};
use crate::envelope::domain::{AgentId, Envelope};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Contract every orchestrated collaborator implements.
///
/// The orchestrator requires nothing beyond this trait: what a concrete
/// agent does with the messages it receives (CORS testing, link crawling,
/// LLM-driven patching, test execution, …) is opaque to the core.
///
/// Implementations typically own a
/// [`crate::agent::services::AgentRuntime`] and delegate to it.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent's unique id on the bus.
    fn id(&self) -> &AgentId;

    /// Returns the agent's display name.
    fn name(&self) -> &str;

    /// Returns the agent's descriptive role.
    fn kind(&self) -> AgentKind;

    /// Returns the agent's declared capabilities.
    fn capabilities(&self) -> &[AgentCapability];

    /// Returns a snapshot of the agent's live status.
    fn status(&self) -> AgentStatus;

    /// Returns a snapshot of the agent's metrics.
    fn metrics(&self) -> AgentMetrics;

    /// Returns a receiver of lifecycle notifications, when the agent emits
    /// them.
    ///
    /// The orchestrator subscribes at registration time and re-emits status
    /// changes for its own observers. The default implementation declares
    /// that no notifications are emitted.
    fn events(&self) -> Option<broadcast::Receiver<AgentEvent>> {
        None
    }

    /// Handles one message, optionally producing a response envelope.
    ///
    /// A returned response is routed back through the bus by the caller,
    /// which is what enables chained request/response without the agent
    /// knowing who is waiting.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the agent cannot process the message at
    /// all; per-handler failures are absorbed by the runtime instead.
    async fn handle(&self, envelope: Envelope) -> Result<Option<Envelope>, AgentError>;

    /// Transitions the agent from idle to running.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the agent cannot start.
    async fn start(&self) -> Result<(), AgentError>;

    /// Transitions the agent back to idle.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when teardown fails; the orchestrator logs
    /// the failure and continues stopping the remaining agents.
    async fn stop(&self) -> Result<(), AgentError>;

    /// Probes the agent's health, updating its reported health value.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the probe itself fails; the orchestrator
    /// logs the failure and leaves the observed health unchanged for that
    /// tick.
    async fn health_check(&self) -> Result<bool, AgentError>;
}
