//! Routing address of a message envelope.

use super::{AgentId, ParseAgentIdError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The wire form of the broadcast address.
const BROADCAST: &str = "broadcast";

/// Destination of a message envelope.
///
/// Serialises as a plain string: either the literal `broadcast` or an agent
/// id. [`AgentId`] construction rejects the broadcast literal, so the two
/// forms never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Recipient {
    /// Every registered agent except the sender and the orchestrator itself.
    Broadcast,
    /// A single agent, looked up in the registry by id.
    Agent(AgentId),
}

impl Recipient {
    /// Returns `true` for the broadcast address.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        matches!(self, Self::Broadcast)
    }

    /// Returns the target agent id for a direct recipient.
    #[must_use]
    pub const fn agent_id(&self) -> Option<&AgentId> {
        match self {
            Self::Broadcast => None,
            Self::Agent(id) => Some(id),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => f.write_str(BROADCAST),
            Self::Agent(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl From<AgentId> for Recipient {
    fn from(id: AgentId) -> Self {
        Self::Agent(id)
    }
}

impl From<Recipient> for String {
    fn from(recipient: Recipient) -> Self {
        recipient.to_string()
    }
}

impl TryFrom<String> for Recipient {
    type Error = ParseAgentIdError;

    fn try_from(value: String) -> Result<Self, ParseAgentIdError> {
        if value.trim().eq_ignore_ascii_case(BROADCAST) {
            return Ok(Self::Broadcast);
        }
        AgentId::new(value).map(Self::Agent)
    }
}
