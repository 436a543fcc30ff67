//! Identifier types for the envelope domain.

use super::ParseAgentIdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a single message envelope.
///
/// Also doubles as the correlation key linking a response to the request
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random message identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a message identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for MessageId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated, human-readable agent identifier.
///
/// Agent ids address envelopes on the bus (e.g. `linkchecker`,
/// `orchestrator`). The literal `broadcast` is reserved as the fan-out
/// address and is rejected here so [`super::Recipient`] parsing stays
/// unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a validated agent identifier.
    ///
    /// The input is trimmed. Whitespace-only values and the reserved
    /// `broadcast` address (in any casing) are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ParseAgentIdError::Empty`] when the value is empty after
    /// trimming, or [`ParseAgentIdError::ReservedBroadcast`] when it names
    /// the broadcast address.
    pub fn new(value: impl Into<String>) -> Result<Self, ParseAgentIdError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ParseAgentIdError::Empty);
        }

        if trimmed.eq_ignore_ascii_case("broadcast") {
            return Err(ParseAgentIdError::ReservedBroadcast(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the agent id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for AgentId {
    type Error = ParseAgentIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
