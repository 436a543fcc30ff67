//! Adapter implementations for the orchestrator bounded context.

mod config_file;

pub use config_file::{
    load_config, parse_config, EnvSource, ProcessEnv, ENV_HEARTBEAT_INTERVAL_MS,
    ENV_MAX_CONCURRENT_AGENTS, ENV_MESSAGE_TIMEOUT_MS, ENV_ORCHESTRATOR_ID, ENV_RETRY_ATTEMPTS,
};
