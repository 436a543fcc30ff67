//! Agent metrics snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Counter name for messages handed to an agent's runtime.
pub const MESSAGES_PROCESSED: &str = "messages_processed";

/// Counter name for handler failures.
pub const HANDLER_ERRORS: &str = "handler_errors";

/// Counter name for tasks a concrete agent reports as completed.
pub const TASKS_COMPLETED: &str = "tasks_completed";

/// Snapshot of an agent's counters plus its derived uptime.
///
/// `uptime` is the time elapsed since the agent last started, and zero while
/// it is stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetrics {
    uptime: Duration,
    counters: BTreeMap<String, u64>,
}

impl AgentMetrics {
    /// Creates a metrics snapshot.
    #[must_use]
    pub const fn new(uptime: Duration, counters: BTreeMap<String, u64>) -> Self {
        Self { uptime, counters }
    }

    /// Returns the time since the agent last started, or zero when stopped.
    #[must_use]
    pub const fn uptime(&self) -> Duration {
        self.uptime
    }

    /// Returns the full counter map.
    #[must_use]
    pub const fn counters(&self) -> &BTreeMap<String, u64> {
        &self.counters
    }

    /// Returns a single counter, defaulting to zero when never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Returns the number of messages handed to the runtime.
    #[must_use]
    pub fn messages_processed(&self) -> u64 {
        self.counter(MESSAGES_PROCESSED)
    }

    /// Returns the number of handler failures.
    #[must_use]
    pub fn handler_errors(&self) -> u64 {
        self.counter(HANDLER_ERRORS)
    }
}
