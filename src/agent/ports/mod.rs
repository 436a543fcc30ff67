//! Port contracts for the agent bounded context.

mod contract;
mod handler;

pub use contract::Agent;
pub use handler::MessageHandler;
