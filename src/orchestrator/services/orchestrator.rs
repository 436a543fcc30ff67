//! The orchestrator: lifecycle, loops, and the public messaging API.

use super::{AgentRegistry, MessageBus};
use crate::agent::domain::{AgentEvent, AgentStatus, Health};
use crate::agent::ports::Agent;
use crate::envelope::domain::{AgentId, Envelope, EnvelopeDraft, MessageId, MessageKind, Recipient};
use crate::orchestrator::domain::{
    OrchestrationConfig, OrchestratorError, OrchestratorEvent, StepOutcome, TaskError,
    TaskOutcome, TaskRequest, Workflow, WorkflowError, WorkflowOutcome,
};
use futures::future::join_all;
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Capacity of the observability event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fixed tick of the queue-drain loop.
const QUEUE_DRAIN_TICK: Duration = Duration::from_millis(100);

/// Running flag and loop handles, guarded together so concurrent `start`
/// and `stop` calls serialise.
#[derive(Default)]
struct Lifecycle {
    running: bool,
    loops: Vec<JoinHandle<()>>,
}

/// Direction of an observed health transition.
enum HealthTransition {
    BecameUnhealthy,
    Recovered,
}

/// Registry, bus, and scheduler coordinating a set of agents.
///
/// Drivers construct concrete agents, register them, start the
/// orchestrator, and then issue direct messages, broadcasts, concurrent
/// task batches, or declarative workflows.
///
/// All locks guard orchestrator-private state and are never held across an
/// await point; the spawned loops share state through `Arc`s only.
pub struct Orchestrator<C = DefaultClock> {
    config: OrchestrationConfig,
    registry: Arc<AgentRegistry>,
    bus: Arc<MessageBus>,
    events: broadcast::Sender<OrchestratorEvent>,
    observed_health: Arc<Mutex<HashMap<AgentId, Health>>>,
    lifecycle: Mutex<Lifecycle>,
    forwarders: Mutex<Vec<JoinHandle<()>>>,
    clock: Arc<C>,
}

impl Orchestrator {
    /// Creates an orchestrator over the system clock.
    #[must_use]
    pub fn new(config: OrchestrationConfig) -> Self {
        Self::with_clock(config, Arc::new(DefaultClock))
    }
}

impl<C> Orchestrator<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator with an injected clock.
    #[must_use]
    pub fn with_clock(config: OrchestrationConfig, clock: Arc<C>) -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let bus = Arc::new(MessageBus::new(
            Arc::clone(&registry),
            config.orchestrator_id().clone(),
        ));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            registry,
            bus,
            events,
            observed_health: Arc::new(Mutex::new(HashMap::new())),
            lifecycle: Mutex::new(Lifecycle::default()),
            forwarders: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Returns the configuration the orchestrator runs with.
    #[must_use]
    pub const fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    /// Returns whether the loops are currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_lifecycle().running
    }

    /// Returns the depth of the pending delivery queue.
    #[must_use]
    pub fn queued_messages(&self) -> usize {
        self.bus.queued()
    }

    /// Returns the number of dispatched tasks still awaiting a response.
    #[must_use]
    pub fn outstanding_tasks(&self) -> usize {
        self.bus.completions().outstanding()
    }

    /// Subscribes to the orchestrator's observability events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.events.subscribe()
    }

    /// Returns one live status snapshot per registered agent.
    #[must_use]
    pub fn agent_statuses(&self) -> Vec<AgentStatus> {
        self.registry.statuses()
    }

    /// Adds an agent to the registry and subscribes to its notifications.
    ///
    /// Registration must happen inside a Tokio runtime: agents that emit
    /// lifecycle events get a forwarding task re-emitting their status
    /// changes as [`OrchestratorEvent::AgentStatusChanged`].
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::ReservedAgentId`] when the agent uses
    /// the orchestrator's own id, or
    /// [`OrchestratorError::DuplicateAgent`] when the id is already taken;
    /// the existing registration is left untouched.
    pub fn register_agent(&self, agent: Arc<dyn Agent>) -> Result<(), OrchestratorError> {
        let id = agent.id().clone();
        if id == *self.config.orchestrator_id() {
            return Err(OrchestratorError::ReservedAgentId(id));
        }

        tracing::info!(agent = %id, name = agent.name(), "registering agent");
        let subscription = agent.events();
        self.registry.insert(agent)?;

        if let Some(source) = subscription {
            let forwarder = tokio::spawn(forward_agent_events(source, self.events.clone()));
            self.lock_forwarders().push(forwarder);
        }

        self.lock_observed_health().insert(id.clone(), Health::Healthy);
        self.emit(OrchestratorEvent::AgentRegistered { id });
        Ok(())
    }

    /// Starts the queue-drain loop and, when monitoring is enabled, the
    /// heartbeat loop.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::AlreadyRunning`] when called while the
    /// loops are already up; no second set of loops is created.
    pub fn start(&self) -> Result<(), OrchestratorError> {
        let mut lifecycle = self.lock_lifecycle();
        if lifecycle.running {
            return Err(OrchestratorError::AlreadyRunning);
        }

        let mut loops = vec![tokio::spawn(drain_loop(
            Arc::clone(&self.bus),
            self.config.max_concurrent_agents(),
        ))];
        if self.config.enable_monitoring() {
            loops.push(tokio::spawn(heartbeat_loop(
                Arc::clone(&self.registry),
                Arc::clone(&self.observed_health),
                self.events.clone(),
                self.config.heartbeat_interval(),
            )));
        }
        lifecycle.loops = loops;
        lifecycle.running = true;
        drop(lifecycle);

        tracing::info!(agents = self.registry.len(), "orchestrator started");
        self.emit(OrchestratorEvent::Started);
        Ok(())
    }

    /// Stops the loops and every registered agent.
    ///
    /// Agents are stopped concurrently; an individual failure is logged and
    /// never aborts the others. Calling `stop` while not running is a
    /// no-op, and `start` may be called again afterwards.
    pub async fn stop(&self) {
        let loops = {
            let mut lifecycle = self.lock_lifecycle();
            if !lifecycle.running {
                return;
            }
            lifecycle.running = false;
            std::mem::take(&mut lifecycle.loops)
        };
        for handle in &loops {
            handle.abort();
        }

        let stops = self.registry.snapshot().into_iter().map(|agent| async move {
            if let Err(error) = agent.stop().await {
                tracing::warn!(agent = %agent.id(), %error, "agent failed to stop cleanly");
            }
        });
        join_all(stops).await;

        tracing::info!("orchestrator stopped");
        self.emit(OrchestratorEvent::Stopped);
    }

    /// Stamps and routes a message to a single agent.
    ///
    /// The draft's sender defaults to the orchestrator's id. A missing
    /// target is logged and dropped during routing; the send itself never
    /// fails.
    pub fn send_direct(&self, to: &AgentId, draft: EnvelopeDraft) {
        let envelope = draft.into_envelope(
            self.config.orchestrator_id(),
            Recipient::Agent(to.clone()),
            &*self.clock,
        );
        self.bus.route(envelope);
    }

    /// Stamps and routes a message to every agent except the sender.
    pub fn broadcast(&self, draft: EnvelopeDraft) {
        let envelope =
            draft.into_envelope(self.config.orchestrator_id(), Recipient::Broadcast, &*self.clock);
        self.bus.route(envelope);
    }

    /// Dispatches a command to one agent and awaits its correlated response.
    ///
    /// The core async correlation primitive: registers a one-shot completion
    /// handle under a fresh correlation id, dispatches the command directly
    /// to the agent, and awaits the handle under the configured message
    /// timeout. The handle is deregistered exactly once, on whichever of
    /// response and timeout happens first. The timeout only stops the wait —
    /// it cannot interrupt the agent's in-flight handler.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::UnknownAgent`] for unregistered targets,
    /// [`TaskError::Failed`] when the agent answers with an error-kind
    /// response, and [`TaskError::Timeout`] when no correlated response
    /// arrives in time.
    pub async fn execute_task(&self, agent_id: &AgentId, task: Value) -> Result<Value, TaskError> {
        let Some(agent) = self.registry.get(agent_id) else {
            return Err(TaskError::UnknownAgent(agent_id.clone()));
        };

        let correlation = MessageId::new();
        let receiver = self.bus.completions().register(correlation);
        let envelope = Envelope::builder(
            self.config.orchestrator_id().clone(),
            Recipient::Agent(agent_id.clone()),
            MessageKind::Command,
        )
        .with_id(correlation)
        .with_payload(task)
        .build(&*self.clock);

        let bus = Arc::clone(&self.bus);
        // Detached on purpose: the timeout below stops the wait, never the
        // in-flight handler.
        drop(tokio::spawn(async move {
            bus.dispatch(agent.as_ref(), envelope).await;
        }));

        let timeout = self.config.message_timeout();
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(response)) => {
                if response.kind() == MessageKind::Error {
                    Err(TaskError::Failed(response.into_payload()))
                } else {
                    Ok(response.into_payload())
                }
            }
            Ok(Err(_closed)) => Err(TaskError::ResponseChannelClosed),
            Err(_elapsed) => {
                self.bus.completions().abandon(correlation);
                Err(TaskError::Timeout {
                    agent: agent_id.clone(),
                    timeout,
                })
            }
        }
    }

    /// Runs a batch of tasks concurrently, aggregating partial failures.
    ///
    /// The returned vector has the same length and order as `requests`;
    /// each entry is either fulfilled with the agent's response payload or
    /// rejected with the failure cause. One task's failure never aborts the
    /// others, and this method itself never fails.
    pub async fn run_concurrent(&self, requests: Vec<TaskRequest>) -> Vec<TaskOutcome> {
        tracing::debug!(operations = requests.len(), "running concurrent tasks");
        let tasks = requests.into_iter().map(|request| async move {
            let (agent_id, task) = request.into_parts();
            match self.execute_task(&agent_id, task).await {
                Ok(value) => TaskOutcome::fulfilled(agent_id, value),
                Err(error) => TaskOutcome::rejected(agent_id, error),
            }
        });
        join_all(tasks).await
    }

    /// Runs a workflow's steps in order.
    ///
    /// Each step fans its shared task out to the listed agents via
    /// [`run_concurrent`](Self::run_concurrent), so per-task failures are
    /// absorbed into the step outcome. A completion condition returning
    /// `false` stops the run cleanly after the current step.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when a step's completion condition fails;
    /// the error aborts the remaining steps and propagates to the caller.
    pub async fn run_workflow(&self, workflow: &Workflow) -> Result<WorkflowOutcome, WorkflowError> {
        tracing::info!(workflow = workflow.name(), "starting workflow");
        let mut steps = Vec::new();
        let mut halted_at = None;

        for step in workflow.steps() {
            tracing::debug!(step = step.name(), "executing workflow step");
            let requests = step
                .agents()
                .iter()
                .map(|agent_id| TaskRequest::new(agent_id.clone(), step.task().clone()))
                .collect();
            let outcomes = self.run_concurrent(requests).await;

            let should_continue = match step.condition() {
                Some(condition) => condition.should_continue(&outcomes).await.map_err(|source| {
                    WorkflowError::Condition {
                        step: step.name().to_owned(),
                        source,
                    }
                })?,
                None => true,
            };

            steps.push(StepOutcome::new(step.name().to_owned(), outcomes));
            if !should_continue {
                tracing::info!(workflow = workflow.name(), step = step.name(), "workflow halted");
                halted_at = Some(step.name().to_owned());
                break;
            }
        }

        tracing::info!(workflow = workflow.name(), "workflow completed");
        Ok(WorkflowOutcome::new(
            workflow.name().to_owned(),
            steps,
            halted_at,
        ))
    }

    fn emit(&self, event: OrchestratorEvent) {
        // A send error only means nobody is subscribed.
        drop(self.events.send(event));
    }

    fn lock_lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_forwarders(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.forwarders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_observed_health(&self) -> std::sync::MutexGuard<'_, HashMap<AgentId, Health>> {
        self.observed_health
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Drop for Orchestrator<C> {
    fn drop(&mut self) {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in &lifecycle.loops {
            handle.abort();
        }
        lifecycle.loops.clear();
        drop(lifecycle);

        let mut forwarders = self.forwarders.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in &*forwarders {
            handle.abort();
        }
        forwarders.clear();
    }
}

impl<C> std::fmt::Debug for Orchestrator<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("agents", &self.registry.len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Periodically drains the pending queue, dispatching each delivery as its
/// own task so no agent blocks another.
async fn drain_loop(bus: Arc<MessageBus>, batch: usize) {
    let mut ticker = tokio::time::interval(QUEUE_DRAIN_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        for delivery in bus.drain(batch) {
            let (recipient, envelope) = delivery.into_parts();
            let Some(agent) = bus.agent_for(&recipient) else {
                tracing::warn!(agent = %recipient, "dropping queued message for unknown agent");
                continue;
            };
            let dispatch_bus = Arc::clone(&bus);
            drop(tokio::spawn(async move {
                dispatch_bus.dispatch(agent.as_ref(), envelope).await;
            }));
        }
    }
}

/// Periodically health-checks every agent, emitting unhealthy/recovered
/// events only on observed transitions.
async fn heartbeat_loop(
    registry: Arc<AgentRegistry>,
    observed_health: Arc<Mutex<HashMap<AgentId, Health>>>,
    events: broadcast::Sender<OrchestratorEvent>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick resolves immediately; consume it so probes start one
    // interval in.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let checks = registry.snapshot().into_iter().map(|agent| {
            let observed = Arc::clone(&observed_health);
            let sink = events.clone();
            async move { check_agent(agent.as_ref(), &observed, &sink).await }
        });
        join_all(checks).await;
    }
}

/// Probes one agent and records any health transition.
async fn check_agent(
    agent: &dyn Agent,
    observed_health: &Mutex<HashMap<AgentId, Health>>,
    events: &broadcast::Sender<OrchestratorEvent>,
) {
    match agent.health_check().await {
        Ok(healthy) => {
            let transition = {
                let mut observed = observed_health
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let previous = observed
                    .get(agent.id())
                    .copied()
                    .unwrap_or(Health::Healthy);
                if !healthy && previous != Health::Critical {
                    observed.insert(agent.id().clone(), Health::Critical);
                    Some(HealthTransition::BecameUnhealthy)
                } else if healthy && previous == Health::Critical {
                    observed.insert(agent.id().clone(), Health::Healthy);
                    Some(HealthTransition::Recovered)
                } else {
                    None
                }
            };
            match transition {
                Some(HealthTransition::BecameUnhealthy) => {
                    tracing::warn!(agent = %agent.id(), "agent is unhealthy");
                    drop(events.send(OrchestratorEvent::AgentUnhealthy {
                        id: agent.id().clone(),
                    }));
                }
                Some(HealthTransition::Recovered) => {
                    tracing::info!(agent = %agent.id(), "agent recovered");
                    drop(events.send(OrchestratorEvent::AgentRecovered {
                        id: agent.id().clone(),
                    }));
                }
                None => {}
            }
        }
        Err(error) => {
            tracing::warn!(agent = %agent.id(), %error, "health check failed");
        }
    }
}

/// Re-emits an agent's status changes as orchestrator events.
async fn forward_agent_events(
    mut source: broadcast::Receiver<AgentEvent>,
    sink: broadcast::Sender<OrchestratorEvent>,
) {
    loop {
        match source.recv().await {
            Ok(AgentEvent::StatusChanged(status)) => {
                drop(sink.send(OrchestratorEvent::AgentStatusChanged { status }));
            }
            Ok(AgentEvent::Started { .. } | AgentEvent::Stopped { .. }) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "agent event stream lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
