//! Concurrent task requests and their per-task outcomes.

use crate::envelope::domain::AgentId;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// One task to run on one agent inside a concurrent batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    agent_id: AgentId,
    task: Value,
}

impl TaskRequest {
    /// Creates a task request.
    #[must_use]
    pub const fn new(agent_id: AgentId, task: Value) -> Self {
        Self { agent_id, task }
    }

    /// Returns the target agent.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the task payload.
    #[must_use]
    pub const fn task(&self) -> &Value {
        &self.task
    }

    /// Splits the request into its parts.
    #[must_use]
    pub fn into_parts(self) -> (AgentId, Value) {
        (self.agent_id, self.task)
    }
}

/// Why a dispatched task did not produce a response payload.
#[derive(Debug, Error)]
pub enum TaskError {
    /// No correlated response arrived within the configured timeout.
    #[error("task for agent '{agent}' timed out after {timeout:?}")]
    Timeout {
        /// The agent that never responded.
        agent: AgentId,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The target agent is not in the registry.
    #[error("agent '{0}' is not registered")]
    UnknownAgent(AgentId),

    /// The agent answered with an error-kind response.
    #[error("agent reported an error response: {0}")]
    Failed(Value),

    /// The completion handle was dropped before a response arrived.
    #[error("response channel closed before a response arrived")]
    ResponseChannelClosed,
}

/// Outcome of one task inside a concurrent batch.
///
/// `run_concurrent` returns one outcome per request, in request order; a
/// rejected entry never disturbs its neighbours.
#[derive(Debug)]
pub struct TaskOutcome {
    agent_id: AgentId,
    result: Result<Value, TaskError>,
}

impl TaskOutcome {
    /// Creates a fulfilled outcome carrying the response payload.
    #[must_use]
    pub const fn fulfilled(agent_id: AgentId, value: Value) -> Self {
        Self {
            agent_id,
            result: Ok(value),
        }
    }

    /// Creates a rejected outcome carrying the failure cause.
    #[must_use]
    pub const fn rejected(agent_id: AgentId, error: TaskError) -> Self {
        Self {
            agent_id,
            result: Err(error),
        }
    }

    /// Returns the agent the task targeted.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns `true` when the task produced a response payload.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns `true` when the task failed or timed out.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.result.is_err()
    }

    /// Returns the response payload of a fulfilled task.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match &self.result {
            Ok(value) => Some(value),
            Err(_) => None,
        }
    }

    /// Returns the failure cause of a rejected task.
    #[must_use]
    pub const fn error(&self) -> Option<&TaskError> {
        match &self.result {
            Ok(_) => None,
            Err(error) => Some(error),
        }
    }

    /// Consumes the outcome and returns the underlying result.
    #[must_use]
    pub fn into_result(self) -> Result<Value, TaskError> {
        self.result
    }
}
