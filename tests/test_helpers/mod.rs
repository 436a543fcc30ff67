//! Shared helpers for integration tests.

use aalto::agent::domain::{
    AgentCapability, AgentError, AgentEvent, AgentKind, AgentMetrics, AgentStatus, HandlerError,
};
use aalto::agent::ports::{Agent, MessageHandler};
use aalto::agent::services::AgentRuntime;
use aalto::envelope::domain::{AgentId, Envelope, MessageKind};
use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::{json, Value};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

/// Builds a validated agent id.
pub fn agent_id(id: &str) -> AgentId {
    AgentId::new(id).expect("valid agent id")
}

/// Polls `condition` every few milliseconds until it holds or `timeout`
/// elapses.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Command handler that records the envelope and echoes a success response.
struct EchoCommandHandler {
    runtime: Arc<AgentRuntime<DefaultClock>>,
    received: Arc<Mutex<Vec<Envelope>>>,
}

#[async_trait]
impl MessageHandler for EchoCommandHandler {
    async fn handle(&self, envelope: &Envelope) -> Result<Option<Envelope>, HandlerError> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(envelope.clone());
        let action = envelope
            .payload()
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_owned();
        Ok(Some(self.runtime.respond(
            envelope,
            MessageKind::Response,
            json!({"success": true, "action": action, "result": "processed"}),
        )))
    }
}

/// Status handler that reports the agent's live status.
struct StatusReportHandler {
    runtime: Arc<AgentRuntime<DefaultClock>>,
}

#[async_trait]
impl MessageHandler for StatusReportHandler {
    async fn handle(&self, envelope: &Envelope) -> Result<Option<Envelope>, HandlerError> {
        let status = serde_json::to_value(self.runtime.status())?;
        Ok(Some(self.runtime.respond(
            envelope,
            MessageKind::Response,
            json!({"agent": self.runtime.name(), "status": status}),
        )))
    }
}

/// Full-stack mock agent built on the runtime base.
///
/// Registers a command handler that records and echoes, and a status
/// handler that reports the live status, mirroring how concrete agents
/// compose the runtime.
pub struct MockAgent {
    runtime: Arc<AgentRuntime<DefaultClock>>,
    received: Arc<Mutex<Vec<Envelope>>>,
}

impl MockAgent {
    /// Creates and wires a mock agent under the given id.
    pub fn new(id: &str) -> Arc<Self> {
        let runtime = Arc::new(AgentRuntime::new(
            agent_id(id),
            "Mock Agent",
            AgentKind::Tool,
            vec![AgentCapability::new("mock-capability", "Mock capability for testing")
                .with_provides(["mock-data"])],
            DefaultClock,
        ));
        let received = Arc::new(Mutex::new(Vec::new()));
        runtime.register_handler(
            MessageKind::Command,
            Arc::new(EchoCommandHandler {
                runtime: Arc::clone(&runtime),
                received: Arc::clone(&received),
            }),
        );
        runtime.register_handler(
            MessageKind::Status,
            Arc::new(StatusReportHandler {
                runtime: Arc::clone(&runtime),
            }),
        );
        Arc::new(Self { runtime, received })
    }

    /// Returns a copy of every command envelope received so far.
    pub fn received(&self) -> Vec<Envelope> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the actions of the received commands, in arrival order.
    pub fn processed_actions(&self) -> Vec<String> {
        self.received()
            .iter()
            .filter_map(|envelope| {
                envelope
                    .payload()
                    .get("action")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .collect()
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn id(&self) -> &AgentId {
        self.runtime.id()
    }

    fn name(&self) -> &str {
        self.runtime.name()
    }

    fn kind(&self) -> AgentKind {
        self.runtime.kind()
    }

    fn capabilities(&self) -> &[AgentCapability] {
        self.runtime.capabilities()
    }

    fn status(&self) -> AgentStatus {
        self.runtime.status()
    }

    fn metrics(&self) -> AgentMetrics {
        self.runtime.metrics()
    }

    fn events(&self) -> Option<tokio::sync::broadcast::Receiver<AgentEvent>> {
        Some(self.runtime.subscribe())
    }

    async fn handle(&self, envelope: Envelope) -> Result<Option<Envelope>, AgentError> {
        Ok(self.runtime.process(&envelope).await)
    }

    async fn start(&self) -> Result<(), AgentError> {
        self.runtime.start();
        Ok(())
    }

    async fn stop(&self) -> Result<(), AgentError> {
        self.runtime.stop();
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        Ok(self.runtime.health_check())
    }
}

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Guard that applies a scoped environment variable update.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets multiple environment variables for the guard lifetime.
    pub fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = env_lock();
        let mut previous = Vec::with_capacity(changes.len());

        for (key, value) in changes {
            previous.push((key.clone(), env::var_os(key)));
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(new_value) => env::set_var(key, new_value),
                    None => env::remove_var(key),
                }
            }
        }

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(previous) => env::set_var(&key, &previous),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}
