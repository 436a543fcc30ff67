//! Message kind discriminator.

use super::ParseMessageKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a message envelope.
///
/// The kind selects which handler bucket the receiving agent invokes; it
/// carries no other orchestration meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A request for the receiving agent to perform work.
    Command,
    /// A reply to an earlier request.
    Response,
    /// A payload-bearing notification with no reply expected.
    Data,
    /// A status report or status request.
    Status,
    /// A failure report.
    Error,
    /// A liveness probe.
    Heartbeat,
}

impl MessageKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Response => "response",
            Self::Data => "data",
            Self::Status => "status",
            Self::Error => "error",
            Self::Heartbeat => "heartbeat",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MessageKind {
    type Error = ParseMessageKindError;

    fn try_from(value: &str) -> Result<Self, ParseMessageKindError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "command" => Ok(Self::Command),
            "response" => Ok(Self::Response),
            "data" => Ok(Self::Data),
            "status" => Ok(Self::Status),
            "error" => Ok(Self::Error),
            "heartbeat" => Ok(Self::Heartbeat),
            _ => Err(ParseMessageKindError(value.to_owned())),
        }
    }
}
