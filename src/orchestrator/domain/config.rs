//! Validated orchestration configuration.

use super::ConfigError;
use crate::envelope::domain::AgentId;
use std::time::Duration;

/// Default drain-batch size.
const DEFAULT_MAX_CONCURRENT_AGENTS: usize = 5;

/// Default heartbeat interval.
const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Default per-task response timeout.
const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default retry budget (carried, not consumed by any retry logic).
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// The orchestrator's reserved id when none is configured.
const DEFAULT_ORCHESTRATOR_ID: &str = "orchestrator";

/// Configuration surface consumed by the orchestrator.
///
/// Validated at construction through [`OrchestrationConfigBuilder`]; the
/// driver owns where the values come from (file, environment, code).
///
/// # Examples
///
/// ```
/// use aalto::orchestrator::domain::OrchestrationConfig;
/// use std::time::Duration;
///
/// let config = OrchestrationConfig::builder()
///     .with_heartbeat_interval(Duration::from_millis(500))
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.heartbeat_interval(), Duration::from_millis(500));
/// assert_eq!(config.orchestrator_id().as_str(), "orchestrator");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationConfig {
    max_concurrent_agents: usize,
    heartbeat_interval: Duration,
    message_timeout: Duration,
    retry_attempts: u32,
    enable_monitoring: bool,
    enable_logging: bool,
    agents: Vec<AgentId>,
    orchestrator_id: AgentId,
}

impl OrchestrationConfig {
    /// Returns a builder seeded with the defaults.
    #[must_use]
    pub fn builder() -> OrchestrationConfigBuilder {
        OrchestrationConfigBuilder::default()
    }

    /// Returns the queue-drain batch size.
    ///
    /// This bounds how many queued messages each drain tick re-routes; it
    /// does not limit `run_concurrent`.
    #[must_use]
    pub const fn max_concurrent_agents(&self) -> usize {
        self.max_concurrent_agents
    }

    /// Returns the heartbeat probe interval.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Returns how long a dispatched task waits for a correlated response.
    #[must_use]
    pub const fn message_timeout(&self) -> Duration {
        self.message_timeout
    }

    /// Returns the configured retry budget.
    ///
    /// Carried for drivers that implement their own retry policy; no retry
    /// logic in the core consumes it.
    #[must_use]
    pub const fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    /// Returns whether the heartbeat monitor runs.
    #[must_use]
    pub const fn enable_monitoring(&self) -> bool {
        self.enable_monitoring
    }

    /// Returns the advisory logging flag.
    ///
    /// Output is controlled by the driver's tracing subscriber; the flag is
    /// carried for drivers that want to branch on it.
    #[must_use]
    pub const fn enable_logging(&self) -> bool {
        self.enable_logging
    }

    /// Returns the declared agent id list.
    ///
    /// Descriptive only; registration is what actually adds agents.
    #[must_use]
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Returns the orchestrator's reserved id.
    ///
    /// Used as the default sender of stamped envelopes and excluded from
    /// broadcast fan-out; registering an agent under this id is rejected.
    #[must_use]
    pub const fn orchestrator_id(&self) -> &AgentId {
        &self.orchestrator_id
    }
}

/// Builder for [`OrchestrationConfig`].
#[derive(Debug, Clone, Default)]
pub struct OrchestrationConfigBuilder {
    max_concurrent_agents: Option<usize>,
    heartbeat_interval: Option<Duration>,
    message_timeout: Option<Duration>,
    retry_attempts: Option<u32>,
    enable_monitoring: Option<bool>,
    enable_logging: Option<bool>,
    agents: Vec<AgentId>,
    orchestrator_id: Option<AgentId>,
}

impl OrchestrationConfigBuilder {
    /// Sets the queue-drain batch size.
    #[must_use]
    pub const fn with_max_concurrent_agents(mut self, value: usize) -> Self {
        self.max_concurrent_agents = Some(value);
        self
    }

    /// Sets the heartbeat probe interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, value: Duration) -> Self {
        self.heartbeat_interval = Some(value);
        self
    }

    /// Sets the per-task response timeout.
    #[must_use]
    pub const fn with_message_timeout(mut self, value: Duration) -> Self {
        self.message_timeout = Some(value);
        self
    }

    /// Sets the carried retry budget.
    #[must_use]
    pub const fn with_retry_attempts(mut self, value: u32) -> Self {
        self.retry_attempts = Some(value);
        self
    }

    /// Enables or disables the heartbeat monitor.
    #[must_use]
    pub const fn with_monitoring(mut self, value: bool) -> Self {
        self.enable_monitoring = Some(value);
        self
    }

    /// Sets the advisory logging flag.
    #[must_use]
    pub const fn with_logging(mut self, value: bool) -> Self {
        self.enable_logging = Some(value);
        self
    }

    /// Declares the expected agent ids.
    #[must_use]
    pub fn with_agents(mut self, agents: impl IntoIterator<Item = AgentId>) -> Self {
        self.agents = agents.into_iter().collect();
        self
    }

    /// Sets the orchestrator's reserved id.
    #[must_use]
    pub fn with_orchestrator_id(mut self, id: AgentId) -> Self {
        self.orchestrator_id = Some(id);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `max_concurrent_agents` is
    /// zero or either interval is zero.
    pub fn build(self) -> Result<OrchestrationConfig, ConfigError> {
        let max_concurrent_agents = self
            .max_concurrent_agents
            .unwrap_or(DEFAULT_MAX_CONCURRENT_AGENTS);
        if max_concurrent_agents == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_agents",
                requirement: "at least 1",
            });
        }

        let heartbeat_interval = self
            .heartbeat_interval
            .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL);
        if heartbeat_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "heartbeat_interval",
                requirement: "greater than zero",
            });
        }

        let message_timeout = self.message_timeout.unwrap_or(DEFAULT_MESSAGE_TIMEOUT);
        if message_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "message_timeout",
                requirement: "greater than zero",
            });
        }

        let orchestrator_id = match self.orchestrator_id {
            Some(id) => id,
            None => AgentId::new(DEFAULT_ORCHESTRATOR_ID)?,
        };

        Ok(OrchestrationConfig {
            max_concurrent_agents,
            heartbeat_interval,
            message_timeout,
            retry_attempts: self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            enable_monitoring: self.enable_monitoring.unwrap_or(true),
            enable_logging: self.enable_logging.unwrap_or(true),
            agents: self.agents,
            orchestrator_id,
        })
    }
}
