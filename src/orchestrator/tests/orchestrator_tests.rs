//! Unit tests for orchestrator lifecycle, task execution, and monitoring.

use super::support::{agent_id, Behaviour, StubAgent};
use crate::orchestrator::domain::{
    ConditionError, OrchestrationConfig, OrchestratorError, OrchestratorEvent, StepCondition,
    TaskError, TaskOutcome, TaskRequest, Workflow, WorkflowError, WorkflowStep,
};
use crate::orchestrator::services::Orchestrator;
use async_trait::async_trait;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn fast_config() -> OrchestrationConfig {
    OrchestrationConfig::builder()
        .with_heartbeat_interval(Duration::from_millis(100))
        .with_message_timeout(Duration::from_millis(200))
        .build()
        .expect("valid configuration")
}

#[fixture]
fn orchestrator() -> Orchestrator {
    Orchestrator::new(fast_config())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_start_is_rejected(orchestrator: Orchestrator) {
    orchestrator.start().expect("first start succeeds");

    let second = orchestrator.start();

    assert!(matches!(second, Err(OrchestratorError::AlreadyRunning)));
    orchestrator.stop().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stop_is_idempotent_and_start_works_again(orchestrator: Orchestrator) {
    orchestrator.stop().await;
    assert!(!orchestrator.is_running());

    orchestrator.start().expect("start succeeds");
    orchestrator.stop().await;
    orchestrator.stop().await;
    assert!(!orchestrator.is_running());

    orchestrator.start().expect("restart succeeds");
    assert!(orchestrator.is_running());
    orchestrator.stop().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registering_the_reserved_id_is_rejected(orchestrator: Orchestrator) {
    let result = orchestrator.register_agent(StubAgent::new("orchestrator", Behaviour::Echo));
    assert!(matches!(result, Err(OrchestratorError::ReservedAgentId(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registering_a_duplicate_id_is_rejected(orchestrator: Orchestrator) {
    orchestrator
        .register_agent(StubAgent::new("mock", Behaviour::Echo))
        .expect("first registration succeeds");

    let duplicate = orchestrator.register_agent(StubAgent::new("mock", Behaviour::Silent));

    assert!(matches!(duplicate, Err(OrchestratorError::DuplicateAgent(_))));
    assert_eq!(orchestrator.agent_statuses().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn execute_task_resolves_with_the_response_payload(orchestrator: Orchestrator) {
    let echo = StubAgent::new("echo", Behaviour::Echo);
    orchestrator
        .register_agent(Arc::clone(&echo) as _)
        .expect("registration succeeds");

    let payload = orchestrator
        .execute_task(&agent_id("echo"), json!({"action": "ping"}))
        .await
        .expect("task fulfils");

    assert_eq!(payload.get("success"), Some(&json!(true)));
    assert_eq!(orchestrator.outstanding_tasks(), 0);

    let received = echo.received();
    assert_eq!(received.len(), 1);
    let request = received.first().expect("one request");
    assert_eq!(request.from(), &agent_id("orchestrator"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn execute_task_rejects_unknown_agents(orchestrator: Orchestrator) {
    let result = orchestrator
        .execute_task(&agent_id("ghost"), json!({"action": "ping"}))
        .await;

    assert!(matches!(result, Err(TaskError::UnknownAgent(_))));
    assert_eq!(orchestrator.outstanding_tasks(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn execute_task_surfaces_error_responses_as_failures(orchestrator: Orchestrator) {
    orchestrator
        .register_agent(StubAgent::new("broken", Behaviour::FailTask))
        .expect("registration succeeds");

    let result = orchestrator
        .execute_task(&agent_id("broken"), json!({"action": "ping"}))
        .await;

    assert!(matches!(result, Err(TaskError::Failed(_))));
    assert_eq!(orchestrator.outstanding_tasks(), 0);
}

#[tokio::test(start_paused = true)]
async fn execute_task_times_out_without_a_correlated_response() {
    let orchestrator = Orchestrator::new(fast_config());
    orchestrator
        .register_agent(StubAgent::new("mute", Behaviour::Silent))
        .expect("registration succeeds");

    let result = orchestrator
        .execute_task(&agent_id("mute"), json!({"action": "ping"}))
        .await;

    assert!(matches!(result, Err(TaskError::Timeout { .. })));
    // The completion handle is deregistered on the timeout path too.
    assert_eq!(orchestrator.outstanding_tasks(), 0);
}

#[tokio::test(start_paused = true)]
async fn repeated_timeouts_leave_no_outstanding_handles() {
    let orchestrator = Orchestrator::new(fast_config());
    orchestrator
        .register_agent(StubAgent::new("mute", Behaviour::Silent))
        .expect("registration succeeds");

    for _ in 0..4 {
        let result = orchestrator
            .execute_task(&agent_id("mute"), json!({"action": "ping"}))
            .await;
        assert!(matches!(result, Err(TaskError::Timeout { .. })));
    }

    assert_eq!(orchestrator.outstanding_tasks(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_concurrent_preserves_length_and_order(orchestrator: Orchestrator) {
    orchestrator
        .register_agent(StubAgent::new("echo", Behaviour::Echo))
        .expect("register echo");
    orchestrator
        .register_agent(StubAgent::new("broken", Behaviour::FailTask))
        .expect("register broken");

    let outcomes = orchestrator
        .run_concurrent(vec![
            TaskRequest::new(agent_id("echo"), json!({"action": "first"})),
            TaskRequest::new(agent_id("ghost"), json!({"action": "second"})),
            TaskRequest::new(agent_id("broken"), json!({"action": "third"})),
            TaskRequest::new(agent_id("echo"), json!({"action": "fourth"})),
        ])
        .await;

    assert_eq!(outcomes.len(), 4);

    let first = outcomes.first().expect("first outcome");
    assert_eq!(first.agent_id(), &agent_id("echo"));
    assert!(first.is_fulfilled());

    let second = outcomes.get(1).expect("second outcome");
    assert!(matches!(second.error(), Some(TaskError::UnknownAgent(_))));

    let third = outcomes.get(2).expect("third outcome");
    assert!(matches!(third.error(), Some(TaskError::Failed(_))));

    let fourth = outcomes.get(3).expect("fourth outcome");
    assert!(fourth.is_fulfilled());
}

/// Condition that always continues.
struct AlwaysContinue;

#[async_trait]
impl StepCondition for AlwaysContinue {
    async fn should_continue(&self, _outcomes: &[TaskOutcome]) -> Result<bool, ConditionError> {
        Ok(true)
    }
}

/// Condition that stops the workflow cleanly.
struct AlwaysStop;

#[async_trait]
impl StepCondition for AlwaysStop {
    async fn should_continue(&self, _outcomes: &[TaskOutcome]) -> Result<bool, ConditionError> {
        Ok(false)
    }
}

/// Condition that aborts the workflow.
struct AlwaysFail;

#[async_trait]
impl StepCondition for AlwaysFail {
    async fn should_continue(&self, _outcomes: &[TaskOutcome]) -> Result<bool, ConditionError> {
        Err(ConditionError::new("verification infrastructure offline"))
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workflow_runs_every_step_in_order(orchestrator: Orchestrator) {
    let echo = StubAgent::new("echo", Behaviour::Echo);
    orchestrator
        .register_agent(Arc::clone(&echo) as _)
        .expect("register echo");

    let workflow = Workflow::new("two-steps", "Exercises sequential steps")
        .with_step(
            WorkflowStep::new("first", [agent_id("echo")], json!({"action": "one"}))
                .with_condition(Arc::new(AlwaysContinue)),
        )
        .with_step(WorkflowStep::new(
            "second",
            [agent_id("echo")],
            json!({"action": "two"}),
        ));

    let outcome = orchestrator
        .run_workflow(&workflow)
        .await
        .expect("workflow completes");

    assert_eq!(outcome.workflow(), "two-steps");
    assert_eq!(outcome.steps().len(), 2);
    assert!(outcome.halted_at().is_none());
    assert_eq!(echo.received().len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workflow_halts_cleanly_when_a_condition_says_stop(orchestrator: Orchestrator) {
    let echo = StubAgent::new("echo", Behaviour::Echo);
    orchestrator
        .register_agent(Arc::clone(&echo) as _)
        .expect("register echo");

    let workflow = Workflow::new("halting", "Stops after the first step")
        .with_step(
            WorkflowStep::new("first", [agent_id("echo")], json!({"action": "one"}))
                .with_condition(Arc::new(AlwaysStop)),
        )
        .with_step(WorkflowStep::new(
            "second",
            [agent_id("echo")],
            json!({"action": "two"}),
        ));

    let outcome = orchestrator
        .run_workflow(&workflow)
        .await
        .expect("workflow halts cleanly");

    assert_eq!(outcome.steps().len(), 1);
    assert_eq!(outcome.halted_at(), Some("first"));
    assert_eq!(echo.received().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workflow_aborts_when_a_condition_fails(orchestrator: Orchestrator) {
    orchestrator
        .register_agent(StubAgent::new("echo", Behaviour::Echo))
        .expect("register echo");

    let workflow = Workflow::new("failing", "Aborts on condition failure").with_step(
        WorkflowStep::new("first", [agent_id("echo")], json!({"action": "one"}))
            .with_condition(Arc::new(AlwaysFail)),
    );

    let result = orchestrator.run_workflow(&workflow).await;

    assert!(matches!(
        result,
        Err(WorkflowError::Condition { step, .. }) if step == "first"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workflow_absorbs_per_task_failures(orchestrator: Orchestrator) {
    orchestrator
        .register_agent(StubAgent::new("echo", Behaviour::Echo))
        .expect("register echo");
    orchestrator
        .register_agent(StubAgent::new("broken", Behaviour::FailTask))
        .expect("register broken");

    let workflow = Workflow::new("mixed", "Partial failure is tolerated").with_step(
        WorkflowStep::new(
            "fan-out",
            [agent_id("echo"), agent_id("broken")],
            json!({"action": "x"}),
        ),
    );

    let outcome = orchestrator
        .run_workflow(&workflow)
        .await
        .expect("workflow completes despite task failure");

    let step = outcome.steps().first().expect("one step");
    assert_eq!(step.outcomes().len(), 2);
    assert!(step.outcomes().first().expect("echo outcome").is_fulfilled());
    assert!(step.outcomes().get(1).expect("broken outcome").is_rejected());
}

#[tokio::test(start_paused = true)]
async fn heartbeat_emits_unhealthy_and_recovered_exactly_once() {
    let orchestrator = Orchestrator::new(fast_config());
    let flaky = StubAgent::new("flaky", Behaviour::Echo);
    orchestrator
        .register_agent(Arc::clone(&flaky) as _)
        .expect("registration succeeds");
    orchestrator.start().expect("start succeeds");

    let mut events = orchestrator.subscribe();

    flaky.set_healthy(false);
    let unhealthy = wait_for_health_event(&mut events).await;
    assert!(matches!(unhealthy, OrchestratorEvent::AgentUnhealthy { .. }));

    flaky.set_healthy(true);
    let recovered = wait_for_health_event(&mut events).await;
    assert!(matches!(recovered, OrchestratorEvent::AgentRecovered { .. }));

    orchestrator.stop().await;
}

/// Awaits the next unhealthy/recovered event, skipping unrelated ones.
async fn wait_for_health_event(
    events: &mut tokio::sync::broadcast::Receiver<OrchestratorEvent>,
) -> OrchestratorEvent {
    loop {
        match events.recv().await.expect("event stream open") {
            event @ (OrchestratorEvent::AgentUnhealthy { .. }
            | OrchestratorEvent::AgentRecovered { .. }) => return event,
            _ => {}
        }
    }
}
