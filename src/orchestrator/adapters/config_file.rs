//! Configuration loading: JSON file plus environment overlay.
//!
//! Precedence, lowest to highest: built-in defaults, the configuration
//! file, then environment variables. Environment access goes through the
//! [`EnvSource`] port so overlays are testable without touching the process
//! environment.

use crate::envelope::domain::AgentId;
use crate::orchestrator::domain::{ConfigError, OrchestrationConfig, OrchestrationConfigBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment override for the orchestrator's reserved id.
pub const ENV_ORCHESTRATOR_ID: &str = "AALTO_ORCHESTRATOR_ID";

/// Environment override for the queue-drain batch size.
pub const ENV_MAX_CONCURRENT_AGENTS: &str = "AALTO_MAX_CONCURRENT_AGENTS";

/// Environment override for the heartbeat interval, in milliseconds.
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "AALTO_HEARTBEAT_INTERVAL_MS";

/// Environment override for the task response timeout, in milliseconds.
pub const ENV_MESSAGE_TIMEOUT_MS: &str = "AALTO_MESSAGE_TIMEOUT_MS";

/// Environment override for the carried retry budget.
pub const ENV_RETRY_ATTEMPTS: &str = "AALTO_RETRY_ATTEMPTS";

/// Read access to environment variables for configuration overlays.
pub trait EnvSource {
    /// Returns the value of `key` when it is set.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// On-disk form of the orchestration configuration.
///
/// Every field is optional; absent fields fall back to the environment and
/// then to the built-in defaults.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    max_concurrent_agents: Option<usize>,
    heartbeat_interval_ms: Option<u64>,
    message_timeout_ms: Option<u64>,
    retry_attempts: Option<u32>,
    enable_monitoring: Option<bool>,
    enable_logging: Option<bool>,
    agents: Option<Vec<String>>,
    orchestrator_id: Option<String>,
}

/// Loads configuration from a JSON file with an environment overlay.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, and any error
/// [`parse_config`] produces.
pub fn load_config(path: &Path, env: &dyn EnvSource) -> Result<OrchestrationConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&raw, env)
}

/// Parses raw JSON configuration and applies the environment overlay.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed JSON,
/// [`ConfigError::InvalidAgentId`] for unusable agent ids,
/// [`ConfigError::InvalidEnv`] for unparsable environment values, and the
/// builder's validation errors.
pub fn parse_config(raw: &str, env: &dyn EnvSource) -> Result<OrchestrationConfig, ConfigError> {
    let file: ConfigFile = serde_json::from_str(raw)?;
    let builder = apply_file(OrchestrationConfig::builder(), file)?;
    apply_env(builder, env)?.build()
}

fn apply_file(
    builder: OrchestrationConfigBuilder,
    file: ConfigFile,
) -> Result<OrchestrationConfigBuilder, ConfigError> {
    let mut updated = builder;
    if let Some(value) = file.max_concurrent_agents {
        updated = updated.with_max_concurrent_agents(value);
    }
    if let Some(value) = file.heartbeat_interval_ms {
        updated = updated.with_heartbeat_interval(Duration::from_millis(value));
    }
    if let Some(value) = file.message_timeout_ms {
        updated = updated.with_message_timeout(Duration::from_millis(value));
    }
    if let Some(value) = file.retry_attempts {
        updated = updated.with_retry_attempts(value);
    }
    if let Some(value) = file.enable_monitoring {
        updated = updated.with_monitoring(value);
    }
    if let Some(value) = file.enable_logging {
        updated = updated.with_logging(value);
    }
    if let Some(raw_ids) = file.agents {
        let ids = raw_ids
            .into_iter()
            .map(AgentId::new)
            .collect::<Result<Vec<_>, _>>()?;
        updated = updated.with_agents(ids);
    }
    if let Some(raw_id) = file.orchestrator_id {
        updated = updated.with_orchestrator_id(AgentId::new(raw_id)?);
    }
    Ok(updated)
}

fn apply_env(
    builder: OrchestrationConfigBuilder,
    env: &dyn EnvSource,
) -> Result<OrchestrationConfigBuilder, ConfigError> {
    let mut updated = builder;
    if let Some(raw_id) = env.var(ENV_ORCHESTRATOR_ID) {
        updated = updated.with_orchestrator_id(AgentId::new(raw_id)?);
    }
    if let Some(value) = parse_env_number(env, ENV_MAX_CONCURRENT_AGENTS)? {
        updated = updated.with_max_concurrent_agents(value);
    }
    if let Some(value) = parse_env_number(env, ENV_HEARTBEAT_INTERVAL_MS)? {
        updated = updated.with_heartbeat_interval(Duration::from_millis(value));
    }
    if let Some(value) = parse_env_number(env, ENV_MESSAGE_TIMEOUT_MS)? {
        updated = updated.with_message_timeout(Duration::from_millis(value));
    }
    if let Some(value) = parse_env_number(env, ENV_RETRY_ATTEMPTS)? {
        updated = updated.with_retry_attempts(value);
    }
    Ok(updated)
}

fn parse_env_number<T: std::str::FromStr>(
    env: &dyn EnvSource,
    variable: &'static str,
) -> Result<Option<T>, ConfigError> {
    env.var(variable).map_or(Ok(None), |raw| {
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                variable,
                value: raw,
            })
    })
}
