//! Shared stub agent for orchestrator unit tests.

use crate::agent::domain::{
    AgentCapability, AgentError, AgentKind, AgentMetrics, AgentStatus,
};
use crate::agent::ports::Agent;
use crate::agent::services::AgentRuntime;
use crate::envelope::domain::{AgentId, Envelope, MessageKind};
use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// How the stub answers commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Reply with a success response echoing the payload.
    Echo,
    /// Consume the message without replying.
    Silent,
    /// Reply with an error-kind response.
    FailTask,
}

/// Minimal in-crate agent double recording everything it receives.
pub struct StubAgent {
    runtime: AgentRuntime<DefaultClock>,
    behaviour: Behaviour,
    received: Mutex<Vec<Envelope>>,
    healthy: AtomicBool,
}

impl StubAgent {
    pub fn new(id: &str, behaviour: Behaviour) -> Arc<Self> {
        let agent_id = AgentId::new(id).expect("valid agent id");
        Arc::new(Self {
            runtime: AgentRuntime::new(
                agent_id,
                format!("Stub {id}"),
                AgentKind::Tool,
                vec![AgentCapability::new("stubbing", "Answers canned responses")],
                DefaultClock,
            ),
            behaviour,
            received: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
        })
    }

    /// Returns a copy of every envelope handled so far.
    pub fn received(&self) -> Vec<Envelope> {
        self.received.lock().expect("stub lock").clone()
    }

    /// Flips the value the stub's health probe reports.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl Agent for StubAgent {
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

    async fn handle(&self, envelope: Envelope) -> Result<Option<Envelope>, AgentError> {
        self.received.lock().expect("stub lock").push(envelope.clone());
        let response = match self.behaviour {
            Behaviour::Echo => Some(self.runtime.respond(
                &envelope,
                MessageKind::Response,
                json!({"success": true, "echo": envelope.payload()}),
            )),
            Behaviour::Silent => None,
            Behaviour::FailTask => Some(self.runtime.respond(
                &envelope,
                MessageKind::Error,
                json!("synthetic task failure"),
            )),
        };
        Ok(response)
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
        Ok(self.healthy.load(Ordering::SeqCst))
    }
}

/// Builds a validated agent id for tests.
pub fn agent_id(id: &str) -> AgentId {
    AgentId::new(id).expect("valid agent id")
}
