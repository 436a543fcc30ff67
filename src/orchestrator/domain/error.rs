//! Error types for the orchestrator bounded context.

use crate::envelope::domain::{AgentId, ParseAgentIdError};
use thiserror::Error;

/// Errors surfaced by the orchestrator's lifecycle and registry operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// `start` was called while the loops were already running.
    #[error("orchestrator is already running")]
    AlreadyRunning,

    /// An agent with the same id is already registered.
    #[error("agent '{0}' is already registered")]
    DuplicateAgent(AgentId),

    /// The id collides with the orchestrator's own reserved id.
    #[error("agent id '{0}' is reserved by the orchestrator")]
    ReservedAgentId(AgentId),
}

/// Errors raised while building or loading orchestration configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value failed validation.
    #[error("{field} must be {requirement}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// What the field must satisfy.
        requirement: &'static str,
    },

    /// An agent id in the configuration failed validation.
    #[error(transparent)]
    InvalidAgentId(#[from] ParseAgentIdError),

    /// The configuration file could not be read.
    #[error("could not read configuration file '{path}'")]
    Io {
        /// The path that failed to load.
        path: String,
        /// The underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON.
    #[error("could not parse configuration file")]
    Parse(#[from] serde_json::Error),

    /// An environment override holds an unusable value.
    #[error("environment variable {variable} holds an invalid value: '{value}'")]
    InvalidEnv {
        /// The offending variable name.
        variable: &'static str,
        /// The rejected value.
        value: String,
    },
}
