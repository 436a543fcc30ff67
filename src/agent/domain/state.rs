//! Agent lifecycle state.

use super::ParseAgentStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an agent.
///
/// Transitions: idle → running on start; running/idle → busy while a
/// message is processed, then back to idle (or to error when every handler
/// failed); error clears on the next successful message; stop returns the
/// agent to idle from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Not started, or stopped.
    Idle,
    /// Started and waiting for work.
    Running,
    /// Processing a message.
    Busy,
    /// The last message failed in every handler.
    Error,
    /// Suspended by its owner.
    Paused,
}

impl AgentState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Busy => "busy",
            Self::Error => "error",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AgentState {
    type Error = ParseAgentStateError;

    fn try_from(value: &str) -> Result<Self, ParseAgentStateError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "idle" => Ok(Self::Idle),
            "running" => Ok(Self::Running),
            "busy" => Ok(Self::Busy),
            "error" => Ok(Self::Error),
            "paused" => Ok(Self::Paused),
            _ => Err(ParseAgentStateError(value.to_owned())),
        }
    }
}
