//! Aalto: an in-process agent messaging and orchestration runtime.
//!
//! Aalto provides the actor-style core for agent-based tooling: a message
//! envelope with correlation metadata, a composable per-agent runtime
//! (lifecycle, health, metrics, type-keyed handlers), and a central
//! orchestrator combining an agent registry, a message bus with a pending
//! queue, a heartbeat monitor, concurrent task dispatch, and multi-step
//! workflow execution.
//!
//! Concrete agents live outside this crate; they implement the
//! [`agent::ports::Agent`] contract, usually by owning an
//! [`agent::services::AgentRuntime`] and registering handler functions.
//!
//! # Architecture
//!
//! Aalto follows hexagonal architecture principles:
//!
//! - **Domain**: Pure data and validation with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (configuration, …)
//! - **Services**: Orchestration logic composing the above
//!
//! # Modules
//!
//! - [`envelope`]: The message envelope and routing protocol
//! - [`agent`]: The agent contract and shared runtime base
//! - [`orchestrator`]: Registry, bus, scheduler, and workflows

pub mod agent;
pub mod envelope;
pub mod orchestrator;
