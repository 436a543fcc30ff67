//! Agent health classification.

use super::ParseHealthError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of an agent as reported by its periodic probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    /// The agent is running and error-free.
    Healthy,
    /// The agent is functional but impaired.
    Degraded,
    /// The agent is stopped, stuck in error, or its probe failed.
    Critical,
}

impl Health {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Health {
    type Error = ParseHealthError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "healthy" => Ok(Self::Healthy),
            "degraded" => Ok(Self::Degraded),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseHealthError(value.to_owned())),
        }
    }
}
