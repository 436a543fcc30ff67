//! Service layer for the agent bounded context.

mod runtime;

pub use runtime::AgentRuntime;
