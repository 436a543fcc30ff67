//! Agent contract and runtime base.
//!
//! Concrete agents (link crawlers, test runners, code fixers, …) live
//! outside this crate; everything the orchestrator needs from them is the
//! [`ports::Agent`] contract. The [`services::AgentRuntime`] base carries
//! the shared lifecycle, health, metrics, and handler-dispatch machinery so
//! a concrete agent only supplies handler functions.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
