//! Domain types for the orchestrator bounded context.

mod config;
mod error;
mod events;
mod outcome;
mod workflow;

pub use config::{OrchestrationConfig, OrchestrationConfigBuilder};
pub use error::{ConfigError, OrchestratorError};
pub use events::OrchestratorEvent;
pub use outcome::{TaskError, TaskOutcome, TaskRequest};
pub use workflow::{
    ConditionError, StepCondition, StepOutcome, Workflow, WorkflowError, WorkflowOutcome,
    WorkflowStep,
};
