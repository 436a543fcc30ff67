//! Agent role discriminator.

use super::ParseAgentKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an agent on the bus.
///
/// Purely descriptive; routing never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Wraps an external tool or service.
    Tool,
    /// Coordinates other agents.
    Orchestrator,
    /// Observes a resource and reports on it.
    Monitor,
    /// Transforms data it is handed.
    Processor,
}

impl AgentKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Orchestrator => "orchestrator",
            Self::Monitor => "monitor",
            Self::Processor => "processor",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AgentKind {
    type Error = ParseAgentKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "tool" => Ok(Self::Tool),
            "orchestrator" => Ok(Self::Orchestrator),
            "monitor" => Ok(Self::Monitor),
            "processor" => Ok(Self::Processor),
            _ => Err(ParseAgentKindError(value.to_owned())),
        }
    }
}
