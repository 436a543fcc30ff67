//! The per-kind message handler seam.

use crate::agent::domain::HandlerError;
use crate::envelope::domain::Envelope;
use async_trait::async_trait;

/// A handler registered for one message kind on an agent runtime.
///
/// Multiple handlers may be registered for the same kind; the runtime
/// invokes them in registration order and the first one returning a
/// response wins.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handles one message, optionally producing a response envelope.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] on failure; the runtime records it and
    /// continues with the next handler for the same kind.
    async fn handle(&self, envelope: &Envelope) -> Result<Option<Envelope>, HandlerError>;
}
