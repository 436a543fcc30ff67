//! Domain types for the message envelope.

mod envelope;
mod error;
mod ids;
mod kind;
mod priority;
mod recipient;

pub use envelope::{Envelope, EnvelopeBuilder, EnvelopeDraft};
pub use error::{ParseAgentIdError, ParseMessageKindError, ParsePriorityError};
pub use ids::{AgentId, MessageId};
pub use kind::MessageKind;
pub use priority::Priority;
pub use recipient::Recipient;
