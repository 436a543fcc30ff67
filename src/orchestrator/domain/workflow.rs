//! Declarative multi-step workflows.
//!
//! A workflow is an ordered sequence of steps; each step fans a shared task
//! out to a set of agents concurrently, and an optional asynchronous
//! condition between steps decides whether to continue.

use super::TaskOutcome;
use crate::envelope::domain::AgentId;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure inside a step's completion condition.
///
/// Unlike per-task failures, which are absorbed into the step outcome, a
/// condition failure aborts the whole workflow.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConditionError {
    message: String,
}

impl ConditionError {
    /// Creates a condition error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised while driving a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A step's completion condition failed.
    #[error("completion condition for step '{step}' failed")]
    Condition {
        /// The step whose condition failed.
        step: String,
        /// The underlying condition failure.
        #[source]
        source: ConditionError,
    },
}

/// Decides, from a step's outcomes, whether the workflow continues.
///
/// Checked between steps only; this is the workflow's sole early-exit
/// mechanism and it is cooperative, never preemptive.
#[async_trait]
pub trait StepCondition: Send + Sync {
    /// Returns `true` to continue with the next step, `false` to stop the
    /// workflow cleanly after the current one.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError`] to abort the workflow; the error
    /// propagates to the `run_workflow` caller.
    async fn should_continue(&self, outcomes: &[TaskOutcome]) -> Result<bool, ConditionError>;
}

/// One step of a workflow: a shared task fanned out to a set of agents.
#[derive(Clone)]
pub struct WorkflowStep {
    name: String,
    agents: Vec<AgentId>,
    task: Value,
    condition: Option<Arc<dyn StepCondition>>,
}

impl WorkflowStep {
    /// Creates a step with no completion condition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        agents: impl IntoIterator<Item = AgentId>,
        task: Value,
    ) -> Self {
        Self {
            name: name.into(),
            agents: agents.into_iter().collect(),
            task,
            condition: None,
        }
    }

    /// Attaches a completion condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Arc<dyn StepCondition>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agents the step fans out to.
    #[must_use]
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Returns the shared task payload.
    #[must_use]
    pub const fn task(&self) -> &Value {
        &self.task
    }

    /// Returns the completion condition, when one is attached.
    #[must_use]
    pub fn condition(&self) -> Option<&Arc<dyn StepCondition>> {
        self.condition.as_ref()
    }
}

impl fmt::Debug for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowStep")
            .field("name", &self.name)
            .field("agents", &self.agents)
            .field("task", &self.task)
            .field("has_condition", &self.condition.is_some())
            .finish()
    }
}

/// A named, ordered sequence of workflow steps.
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    description: String,
    steps: Vec<WorkflowStep>,
}

impl Workflow {
    /// Creates an empty workflow.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the workflow description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }
}

/// Outcomes of one executed workflow step.
#[derive(Debug)]
pub struct StepOutcome {
    step: String,
    outcomes: Vec<TaskOutcome>,
}

impl StepOutcome {
    /// Creates a step outcome.
    #[must_use]
    pub const fn new(step: String, outcomes: Vec<TaskOutcome>) -> Self {
        Self { step, outcomes }
    }

    /// Returns the step name.
    #[must_use]
    pub fn step(&self) -> &str {
        &self.step
    }

    /// Returns the per-task outcomes, in fan-out order.
    #[must_use]
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }
}

/// Result of a completed (or cleanly halted) workflow run.
#[derive(Debug)]
pub struct WorkflowOutcome {
    workflow: String,
    steps: Vec<StepOutcome>,
    halted_at: Option<String>,
}

impl WorkflowOutcome {
    /// Creates a workflow outcome.
    #[must_use]
    pub const fn new(workflow: String, steps: Vec<StepOutcome>, halted_at: Option<String>) -> Self {
        Self {
            workflow,
            steps,
            halted_at,
        }
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    /// Returns the executed steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[StepOutcome] {
        &self.steps
    }

    /// Returns the step at which a condition stopped the run, if any.
    #[must_use]
    pub fn halted_at(&self) -> Option<&str> {
        self.halted_at.as_deref()
    }
}
