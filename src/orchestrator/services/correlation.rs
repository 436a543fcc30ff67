//! Correlation-id-keyed completion handles.
//!
//! The registry turns fire-and-route messaging into awaitable calls: a task
//! dispatcher registers a handle under a fresh correlation id, and routing
//! resolves the handle when a response bearing that id comes past. Each
//! handle is deregistered exactly once, on whichever of response or timeout
//! occurs first.

use crate::envelope::domain::{Envelope, MessageId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

/// Registry of outstanding request completions.
#[derive(Default)]
pub struct CompletionRegistry {
    pending: Mutex<HashMap<MessageId, oneshot::Sender<Envelope>>>,
}

impl CompletionRegistry {
    /// Creates an empty completion registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a completion handle for `correlation` and returns the
    /// receiving half.
    ///
    /// A second registration under the same id replaces the first, whose
    /// receiver then resolves as closed.
    #[must_use]
    pub fn register(&self, correlation: MessageId) -> oneshot::Receiver<Envelope> {
        let (sender, receiver) = oneshot::channel();
        self.lock_pending().insert(correlation, sender);
        receiver
    }

    /// Resolves the handle registered under `correlation` with `envelope`.
    ///
    /// Returns `None` when a handle claimed the envelope, or gives the
    /// envelope back for normal routing when nothing was waiting. A claimed
    /// envelope whose receiver has already been dropped is discarded; the
    /// waiter is gone either way.
    #[must_use]
    pub fn complete(&self, correlation: MessageId, envelope: Envelope) -> Option<Envelope> {
        let sender = self.lock_pending().remove(&correlation);
        match sender {
            Some(handle) => {
                drop(handle.send(envelope));
                None
            }
            None => Some(envelope),
        }
    }

    /// Drops the handle registered under `correlation`, if it still exists.
    ///
    /// Called on the timeout path so an eventual late response routes as an
    /// ordinary message instead of resolving a stale handle.
    pub fn abandon(&self, correlation: MessageId) {
        self.lock_pending().remove(&correlation);
    }

    /// Returns the number of outstanding handles.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<MessageId, oneshot::Sender<Envelope>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CompletionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRegistry")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}
