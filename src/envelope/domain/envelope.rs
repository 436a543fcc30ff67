//! The message envelope and its construction helpers.
//!
//! Envelopes are immutable after creation and carry everything the bus needs
//! to route them: addressing, kind, advisory priority, and optional
//! request/response correlation.

use super::{AgentId, MessageId, MessageKind, Priority, Recipient};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single unit of communication between agents.
///
/// # Invariants
///
/// - `id` is a freshly generated, non-nil UUID
/// - `timestamp` is stamped from the supplied clock at construction
/// - `correlation_id`, when present, equals the id of an earlier request
/// - Envelopes cannot be modified after creation
///
/// # Examples
///
/// ```
/// use aalto::envelope::domain::{AgentId, Envelope, MessageKind, Recipient};
/// use mockable::DefaultClock;
/// use serde_json::json;
///
/// let clock = DefaultClock;
/// let from = AgentId::new("orchestrator").expect("valid id");
/// let to = AgentId::new("linkchecker").expect("valid id");
/// let envelope = Envelope::new(
///     from,
///     Recipient::Agent(to),
///     MessageKind::Command,
///     json!({"action": "check-links"}),
///     &clock,
/// );
///
/// assert_eq!(envelope.kind(), MessageKind::Command);
/// assert!(envelope.correlation_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique identifier for this envelope.
    id: MessageId,

    /// The sending agent, or the orchestrator's reserved id.
    from: AgentId,

    /// The destination: a single agent or the broadcast address.
    to: Recipient,

    /// Handler-bucket discriminator.
    kind: MessageKind,

    /// Opaque payload; the core never inspects it.
    payload: Value,

    /// When the envelope was stamped.
    timestamp: DateTime<Utc>,

    /// Advisory priority, carried but never enforced.
    priority: Priority,

    /// Links a response to the request that produced it.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<MessageId>,
}

impl Envelope {
    /// Creates an envelope with a fresh id, the current timestamp, medium
    /// priority, and no correlation.
    #[must_use]
    pub fn new(
        from: AgentId,
        to: Recipient,
        kind: MessageKind,
        payload: Value,
        clock: &impl Clock,
    ) -> Self {
        Self::builder(from, to, kind).with_payload(payload).build(clock)
    }

    /// Returns a builder for constructing envelopes with full control.
    #[must_use]
    pub const fn builder(from: AgentId, to: Recipient, kind: MessageKind) -> EnvelopeBuilder {
        EnvelopeBuilder {
            id: None,
            from,
            to,
            kind,
            payload: Value::Null,
            priority: Priority::Medium,
            correlation_id: None,
        }
    }

    /// Builds a reply addressed to this envelope's sender.
    ///
    /// The reply inherits the original priority and carries
    /// `correlation_id = self.id()`, which is what lets the orchestrator
    /// match it to an outstanding request.
    #[must_use]
    pub fn reply(
        &self,
        from: AgentId,
        kind: MessageKind,
        payload: Value,
        clock: &impl Clock,
    ) -> Self {
        Self::builder(from, Recipient::Agent(self.from.clone()), kind)
            .with_payload(payload)
            .with_priority(self.priority)
            .with_correlation_id(self.id)
            .build(clock)
    }

    /// Returns the envelope identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the sender.
    #[must_use]
    pub const fn from(&self) -> &AgentId {
        &self.from
    }

    /// Returns the destination.
    #[must_use]
    pub const fn to(&self) -> &Recipient {
        &self.to
    }

    /// Returns the message kind.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the opaque payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the stamping timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the advisory priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the correlation id linking this envelope to a request.
    #[must_use]
    pub const fn correlation_id(&self) -> Option<MessageId> {
        self.correlation_id
    }

    /// Consumes the envelope and returns its payload.
    #[must_use]
    pub fn into_payload(self) -> Value {
        self.payload
    }
}

/// Builder for constructing envelopes with full control over all fields.
#[derive(Debug)]
pub struct EnvelopeBuilder {
    id: Option<MessageId>,
    from: AgentId,
    to: Recipient,
    kind: MessageKind,
    payload: Value,
    priority: Priority,
    correlation_id: Option<MessageId>,
}

impl EnvelopeBuilder {
    /// Sets a specific envelope id instead of generating one.
    #[must_use]
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Sets the advisory priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: MessageId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Builds the envelope, stamping the id (unless fixed) and timestamp.
    #[must_use]
    pub fn build(self, clock: &impl Clock) -> Envelope {
        Envelope {
            id: self.id.unwrap_or_default(),
            from: self.from,
            to: self.to,
            kind: self.kind,
            payload: self.payload,
            timestamp: clock.utc(),
            priority: self.priority,
            correlation_id: self.correlation_id,
        }
    }
}

/// A partial message supplied to the orchestrator's send operations.
///
/// The orchestrator stamps the id, timestamp, and destination itself; the
/// draft carries only what the caller decides. A draft without an explicit
/// sender is stamped with the orchestrator's reserved id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeDraft {
    kind: MessageKind,
    payload: Value,
    priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<MessageId>,
}

impl EnvelopeDraft {
    /// Creates a draft of the given kind with medium priority.
    #[must_use]
    pub const fn new(kind: MessageKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            priority: Priority::Medium,
            from: None,
            correlation_id: None,
        }
    }

    /// Creates a command draft.
    #[must_use]
    pub const fn command(payload: Value) -> Self {
        Self::new(MessageKind::Command, payload)
    }

    /// Sets the advisory priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets an explicit sender instead of the orchestrator's id.
    #[must_use]
    pub fn with_from(mut self, from: AgentId) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: MessageId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Returns the message kind.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the explicit sender, if any.
    #[must_use]
    pub const fn from(&self) -> Option<&AgentId> {
        self.from.as_ref()
    }

    /// Seals the draft into a routable envelope.
    ///
    /// Stamps a fresh id and the current timestamp; `fallback_from` is used
    /// when the draft carries no explicit sender.
    #[must_use]
    pub fn into_envelope(
        self,
        fallback_from: &AgentId,
        to: Recipient,
        clock: &impl Clock,
    ) -> Envelope {
        let from = self.from.unwrap_or_else(|| fallback_from.clone());
        let mut builder = Envelope::builder(from, to, self.kind)
            .with_payload(self.payload)
            .with_priority(self.priority);
        if let Some(correlation_id) = self.correlation_id {
            builder = builder.with_correlation_id(correlation_id);
        }
        builder.build(clock)
    }
}
