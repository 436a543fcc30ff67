//! Error types for the agent bounded context.

use std::error::Error;
use thiserror::Error as ThisError;

/// Failure inside a message handler.
///
/// Caught per handler by the runtime: the agent's error counter is
/// incremented and the remaining handlers for the message still run.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl HandlerError {
    /// Creates a handler error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_source("payload deserialisation failed", error)
    }
}

/// Errors surfaced through the [`crate::agent::ports::Agent`] contract.
#[derive(Debug, ThisError)]
pub enum AgentError {
    /// A message handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// A custom health probe failed.
    #[error("health probe failed: {0}")]
    HealthProbe(String),
}

/// Error returned while parsing an agent kind from its wire form.
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
#[error("unknown agent kind: {0}")]
pub struct ParseAgentKindError(pub String);

/// Error returned while parsing an agent state from its wire form.
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
#[error("unknown agent state: {0}")]
pub struct ParseAgentStateError(pub String);

/// Error returned while parsing a health value from its wire form.
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
#[error("unknown health value: {0}")]
pub struct ParseHealthError(pub String);
