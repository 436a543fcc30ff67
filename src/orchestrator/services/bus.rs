//! The message bus: routing, the pending queue, and agent dispatch.
//!
//! Delivery is exactly-once via the pending queue: `route` only ever
//! enqueues, and the orchestrator's drain loop is the single place queued
//! messages are handed to agents. Responses an agent returns from `handle`
//! are fed straight back into `route`, which is what chains
//! request/response without blocking the original caller.

use super::{AgentRegistry, CompletionRegistry};
use crate::agent::ports::Agent;
use crate::envelope::domain::{AgentId, Envelope, Recipient};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A queued message together with its resolved recipient.
///
/// Broadcast envelopes fan out into one delivery per recipient at routing
/// time, so the drain loop never re-resolves the broadcast address.
#[derive(Debug, Clone)]
pub struct PendingDelivery {
    recipient: AgentId,
    envelope: Envelope,
}

impl PendingDelivery {
    /// Returns the resolved recipient.
    #[must_use]
    pub const fn recipient(&self) -> &AgentId {
        &self.recipient
    }

    /// Returns the queued envelope.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Splits the delivery into its parts.
    #[must_use]
    pub fn into_parts(self) -> (AgentId, Envelope) {
        (self.recipient, self.envelope)
    }
}

/// Routing and queueing core shared by the orchestrator and its loops.
pub struct MessageBus {
    registry: Arc<AgentRegistry>,
    completions: CompletionRegistry,
    queue: Mutex<VecDeque<PendingDelivery>>,
    orchestrator_id: AgentId,
}

impl MessageBus {
    /// Creates a bus over the given registry.
    #[must_use]
    pub fn new(registry: Arc<AgentRegistry>, orchestrator_id: AgentId) -> Self {
        Self {
            registry,
            completions: CompletionRegistry::new(),
            queue: Mutex::new(VecDeque::new()),
            orchestrator_id,
        }
    }

    /// Returns the completion registry for task correlation.
    #[must_use]
    pub const fn completions(&self) -> &CompletionRegistry {
        &self.completions
    }

    /// Returns the number of queued deliveries.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.lock_queue().len()
    }

    /// Looks up a registered agent for the drain loop.
    #[must_use]
    pub fn agent_for(&self, id: &AgentId) -> Option<Arc<dyn Agent>> {
        self.registry.get(id)
    }

    /// Routes one envelope.
    ///
    /// A response whose correlation id matches an outstanding completion
    /// handle is consumed by that handle and travels no further. Broadcasts
    /// fan out to every registered agent except the sender and the
    /// orchestrator itself. Direct envelopes for unknown agents are logged
    /// and dropped — no retry, no error to the sender.
    pub fn route(&self, envelope: Envelope) {
        let unclaimed = match envelope.correlation_id() {
            Some(correlation) => match self.completions.complete(correlation, envelope) {
                None => return,
                Some(returned) => returned,
            },
            None => envelope,
        };

        let destination = unclaimed.to().clone();
        match destination {
            Recipient::Broadcast => self.fan_out(&unclaimed),
            Recipient::Agent(recipient) => {
                if self.registry.contains(&recipient) {
                    self.enqueue(recipient, unclaimed);
                } else {
                    tracing::warn!(
                        agent = %recipient,
                        message = %unclaimed.id(),
                        "dropping message for unknown agent"
                    );
                }
            }
        }
    }

    /// Invokes an agent's handler and routes any response it produces.
    pub async fn dispatch(&self, agent: &dyn Agent, envelope: Envelope) {
        let message_id = envelope.id();
        match agent.handle(envelope).await {
            Ok(Some(response)) => self.route(response),
            Ok(None) => {}
            Err(error) => {
                tracing::error!(
                    agent = %agent.id(),
                    message = %message_id,
                    %error,
                    "agent failed to process message"
                );
            }
        }
    }

    /// Pops up to `max` queued deliveries, oldest first.
    #[must_use]
    pub fn drain(&self, max: usize) -> Vec<PendingDelivery> {
        let mut queue = self.lock_queue();
        let take = queue.len().min(max);
        queue.drain(..take).collect()
    }

    fn fan_out(&self, envelope: &Envelope) {
        for agent in self.registry.snapshot() {
            let recipient = agent.id();
            if recipient == envelope.from() || *recipient == self.orchestrator_id {
                continue;
            }
            self.enqueue(recipient.clone(), envelope.clone());
        }
    }

    fn enqueue(&self, recipient: AgentId, envelope: Envelope) {
        self.lock_queue().push_back(PendingDelivery {
            recipient,
            envelope,
        });
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<PendingDelivery>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("orchestrator_id", &self.orchestrator_id)
            .field("queued", &self.queued())
            .field("outstanding", &self.completions.outstanding())
            .finish()
    }
}
