//! Shared runtime base for concrete agents.
//!
//! Concrete agents own an [`AgentRuntime`] (composition, not inheritance)
//! and delegate the [`crate::agent::ports::Agent`] contract to it, supplying
//! only their handler functions.

use crate::agent::domain::{
    AgentCapability, AgentEvent, AgentKind, AgentMetrics, AgentState, AgentStatus, Health,
    HANDLER_ERRORS, MESSAGES_PROCESSED,
};
use crate::agent::ports::MessageHandler;
use crate::envelope::domain::{AgentId, Envelope, MessageKind};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;

/// Capacity of the lifecycle notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Mutable portion of the runtime, guarded by one lock.
#[derive(Debug)]
struct RuntimeState {
    state: AgentState,
    health: Health,
    last_activity: DateTime<Utc>,
    counters: BTreeMap<String, u64>,
    running: bool,
    started_at: Option<DateTime<Utc>>,
}

/// Lifecycle, health, metrics, and handler dispatch shared by all agents.
///
/// The runtime keeps the agent's live status behind a lock whose scope never
/// crosses an await point, making it safe to share across the multi-threaded
/// scheduler. Lifecycle notifications go out over an explicit broadcast
/// channel; sends with no subscriber are silently dropped.
pub struct AgentRuntime<C> {
    id: AgentId,
    name: String,
    kind: AgentKind,
    capabilities: Vec<AgentCapability>,
    state: RwLock<RuntimeState>,
    handlers: RwLock<HashMap<MessageKind, Vec<Arc<dyn MessageHandler>>>>,
    events: broadcast::Sender<AgentEvent>,
    clock: C,
}

impl<C> AgentRuntime<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a runtime in the idle, healthy state.
    #[must_use]
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        kind: AgentKind,
        capabilities: Vec<AgentCapability>,
        clock: C,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let now = clock.utc();
        Self {
            id,
            name: name.into(),
            kind,
            capabilities,
            state: RwLock::new(RuntimeState {
                state: AgentState::Idle,
                health: Health::Healthy,
                last_activity: now,
                counters: BTreeMap::new(),
                running: false,
                started_at: None,
            }),
            handlers: RwLock::new(HashMap::new()),
            events,
            clock,
        }
    }

    /// Returns the agent id.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agent's descriptive role.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Returns the declared capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &[AgentCapability] {
        &self.capabilities
    }

    /// Returns whether the runtime is between `start` and `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.read_state().running
    }

    /// Appends a handler to the bucket for `kind`.
    ///
    /// Handlers run in registration order; the first one returning a
    /// response short-circuits the rest for that message.
    pub fn register_handler(&self, kind: MessageKind, handler: Arc<dyn MessageHandler>) {
        let mut registry = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.entry(kind).or_default().push(handler);
    }

    /// Subscribes to this agent's lifecycle notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    /// Transitions the agent from idle to running.
    pub fn start(&self) {
        let status = {
            let mut state = self.write_state();
            let now = self.clock.utc();
            state.running = true;
            state.state = AgentState::Running;
            state.started_at = Some(now);
            state.last_activity = now;
            Self::snapshot(&self.id, &self.name, &state)
        };
        tracing::info!(agent = %self.id, "agent started");
        self.emit(AgentEvent::Started {
            id: self.id.clone(),
        });
        self.emit(AgentEvent::StatusChanged(status));
    }

    /// Transitions the agent back to idle.
    pub fn stop(&self) {
        let status = {
            let mut state = self.write_state();
            state.running = false;
            state.state = AgentState::Idle;
            state.started_at = None;
            state.last_activity = self.clock.utc();
            Self::snapshot(&self.id, &self.name, &state)
        };
        tracing::info!(agent = %self.id, "agent stopped");
        self.emit(AgentEvent::Stopped {
            id: self.id.clone(),
        });
        self.emit(AgentEvent::StatusChanged(status));
    }

    /// Probes basic liveness: healthy iff running and not stuck in error.
    ///
    /// Updates the reported health without touching the lifecycle state.
    pub fn health_check(&self) -> bool {
        let mut state = self.write_state();
        let healthy = state.running && state.state != AgentState::Error;
        state.health = if healthy {
            Health::Healthy
        } else {
            Health::Critical
        };
        state.last_activity = self.clock.utc();
        healthy
    }

    /// Overrides the reported health.
    ///
    /// Intended for agents with custom probes, e.g. to report `Critical`
    /// when the probe itself fails, or `Degraded` on partial impairment.
    pub fn set_health(&self, health: Health) {
        let mut state = self.write_state();
        state.health = health;
        state.last_activity = self.clock.utc();
    }

    /// Increments a named counter.
    pub fn increment(&self, counter: &str) {
        let mut state = self.write_state();
        let entry = state.counters.entry(counter.to_owned()).or_insert(0);
        *entry = entry.saturating_add(1);
    }

    /// Returns a snapshot of the live status.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        let state = self.read_state();
        Self::snapshot(&self.id, &self.name, &state)
    }

    /// Returns the counter map plus the derived uptime.
    ///
    /// Uptime is the time elapsed since the last `start`, and zero while
    /// the agent is stopped.
    #[must_use]
    pub fn metrics(&self) -> AgentMetrics {
        let state = self.read_state();
        let uptime = state.started_at.map_or(Duration::ZERO, |started_at| {
            (self.clock.utc() - started_at).to_std().unwrap_or_default()
        });
        AgentMetrics::new(uptime, state.counters.clone())
    }

    /// Builds a response envelope addressed to `original`'s sender.
    #[must_use]
    pub fn respond(&self, original: &Envelope, kind: MessageKind, payload: Value) -> Envelope {
        original.reply(self.id.clone(), kind, payload, &self.clock)
    }

    /// Dispatches one message through the handler buckets for its kind.
    ///
    /// Increments the message counter, transitions busy for the duration,
    /// and invokes every registered handler in order. A failing handler is
    /// recorded and skipped; the first handler returning a response
    /// short-circuits the rest. The agent lands in the error state only
    /// when at least one handler failed and none produced a response.
    pub async fn process(&self, envelope: &Envelope) -> Option<Envelope> {
        self.increment(MESSAGES_PROCESSED);
        self.transition(AgentState::Busy);

        let handlers = {
            let registry = self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            registry.get(&envelope.kind()).cloned().unwrap_or_default()
        };

        let mut response = None;
        let mut failures = 0_u32;
        for handler in handlers {
            match handler.handle(envelope).await {
                Ok(Some(reply)) => {
                    response = Some(reply);
                    break;
                }
                Ok(None) => {}
                Err(error) => {
                    failures = failures.saturating_add(1);
                    self.increment(HANDLER_ERRORS);
                    tracing::error!(agent = %self.id, %error, "message handler failed");
                }
            }
        }

        let next = if response.is_none() && failures > 0 {
            AgentState::Error
        } else {
            AgentState::Idle
        };
        self.transition(next);
        response
    }

    fn transition(&self, next: AgentState) {
        let status = {
            let mut state = self.write_state();
            state.state = next;
            state.last_activity = self.clock.utc();
            Self::snapshot(&self.id, &self.name, &state)
        };
        self.emit(AgentEvent::StatusChanged(status));
    }

    fn emit(&self, event: AgentEvent) {
        // A send error only means nobody is subscribed.
        drop(self.events.send(event));
    }

    fn snapshot(id: &AgentId, name: &str, state: &RuntimeState) -> AgentStatus {
        AgentStatus::new(
            id.clone(),
            name.to_owned(),
            state.state,
            state.last_activity,
            state.health,
            state.counters.clone(),
        )
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, RuntimeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, RuntimeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> std::fmt::Debug for AgentRuntime<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
