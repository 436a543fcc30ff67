//! Error types for envelope domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing an agent identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseAgentIdError {
    /// The identifier is empty after trimming.
    #[error("agent id must not be empty")]
    Empty,

    /// The identifier collides with the reserved broadcast address.
    #[error("agent id '{0}' is reserved for broadcast routing")]
    ReservedBroadcast(String),
}

/// Error returned while parsing a message kind from its wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown message kind: {0}")]
pub struct ParseMessageKindError(pub String);

/// Error returned while parsing a priority from its wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);
