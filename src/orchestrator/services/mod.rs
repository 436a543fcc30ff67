//! Service layer for the orchestrator bounded context.

mod bus;
mod correlation;
mod orchestrator;
mod registry;

pub use bus::{MessageBus, PendingDelivery};
pub use correlation::CompletionRegistry;
pub use orchestrator::Orchestrator;
pub use registry::AgentRegistry;
