//! Workflow Integration Tests
//!
//! Drive the full propose / decide / execute lifecycle through `PlanWorkflow`
//! with a scripted reasoning client and counting executors:
//! - Rejected plans never reach an executor
//! - Partial results are stored once and replayed
//! - Concurrent decisions and executions resolve to a single outcome
//! - File-backed state survives a restart

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use copilot_engine::application::ports::{
    CommandContext, CommandExecutorPort, CommandFailure, NoContextProvider, ReasoningOutput,
};
use copilot_engine::domain::command_plan::{CommandDomain, ProposedCommand};
use copilot_engine::infrastructure::reasoning::ScriptedReasoningClient;
use copilot_engine::{
    AuditLogStore, Command, CommandOutcome, DecisionRequest, DraftStatus, ErrorCode,
    ExecutePlanRequest, ExecutionLedger, ExecutionStatus, ExecutorRegistry, FailureKind,
    FileAuditLog, FileExecutionLedger, InMemoryAuditLog, InMemoryExecutionLedger, PlanId,
    PlanWorkflow, ProposePlanRequest, WorkflowSettings,
};
use serde_json::json;

/// Executor that records every command and fails the listed order ids.
#[derive(Default)]
struct RecordingExecutor {
    failing: Vec<(&'static str, FailureKind)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<CommandContext>>,
}

impl RecordingExecutor {
    fn failing(order_id: &'static str, kind: FailureKind) -> Self {
        Self {
            failing: vec![(order_id, kind)],
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandExecutorPort for RecordingExecutor {
    async fn run(
        &self,
        command: &Command,
        ctx: &CommandContext,
    ) -> Result<serde_json::Value, CommandFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(ctx.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let order_id = command
            .param("orderId")
            .map(ToString::to_string)
            .unwrap_or_default();
        match self.failing.iter().find(|(id, _)| *id == order_id) {
            Some((_, kind)) => Err(CommandFailure::new(*kind, "Too many requests")),
            None => Ok(json!({ "orderId": order_id, "status": "accepted" })),
        }
    }
}

fn reasoning_with(commands: Vec<ProposedCommand>) -> Arc<ScriptedReasoningClient> {
    Arc::new(ScriptedReasoningClient::new(ReasoningOutput {
        commands,
        confidence: 0.9,
        ..ReasoningOutput::default()
    }))
}

fn cancel(order_id: &str) -> ProposedCommand {
    ProposedCommand::new("CancelOrder", json!({ "orderId": order_id, "reason": "user request" }))
}

fn workflow<A, L>(
    audit: Arc<A>,
    ledger: Arc<L>,
    executor: Arc<RecordingExecutor>,
    commands: Vec<ProposedCommand>,
) -> PlanWorkflow<ScriptedReasoningClient, NoContextProvider, A, L>
where
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    let executor: Arc<dyn CommandExecutorPort> = executor;
    let registry = ExecutorRegistry::new().register_domain(CommandDomain::Orders, &executor);
    PlanWorkflow::new(
        reasoning_with(commands),
        Arc::new(NoContextProvider),
        audit,
        ledger,
        registry,
        WorkflowSettings::default(),
    )
}

fn in_memory_workflow(
    executor: Arc<RecordingExecutor>,
    commands: Vec<ProposedCommand>,
) -> PlanWorkflow<ScriptedReasoningClient, NoContextProvider, InMemoryAuditLog, InMemoryExecutionLedger>
{
    workflow(
        Arc::new(InMemoryAuditLog::new()),
        Arc::new(InMemoryExecutionLedger::new()),
        executor,
        commands,
    )
}

// ============================================
// Lifecycle Scenarios
// ============================================

#[tokio::test]
async fn test_rejected_plan_is_never_executed() {
    let executor = Arc::new(RecordingExecutor::default());
    let wf = in_memory_workflow(Arc::clone(&executor), vec![cancel("O-1")]);

    let plan = wf
        .propose(ProposePlanRequest::new("Cancel order O-1", "trader-1"))
        .await
        .expect("proposal should succeed");
    assert_eq!(plan.commands().len(), 1);

    let status = wf
        .reject(
            plan.plan_id(),
            DecisionRequest::new("trader-1").with_reason("wrong order"),
        )
        .await
        .expect("rejection should succeed");
    assert_eq!(status, DraftStatus::Rejected);

    let err = wf
        .execute(plan.plan_id(), ExecutePlanRequest::new("trader-1"))
        .await
        .expect_err("rejected plan must not execute");
    assert_eq!(err.code(), ErrorCode::PlanNotApproved);
    assert_eq!(executor.calls(), 0);

    let trail = wf.audit_trail(plan.plan_id()).await.unwrap();
    assert_eq!(trail.events.len(), 2);
    assert!(trail.execution.is_none());
}

#[tokio::test]
async fn test_partial_result_is_stored_once_and_replayed() {
    let executor = Arc::new(RecordingExecutor::failing("O-2", FailureKind::RateLimited));
    let wf = in_memory_workflow(
        Arc::clone(&executor),
        vec![cancel("O-1"), cancel("O-2")],
    );

    let plan = wf
        .propose(ProposePlanRequest::new("Cancel O-1 and O-2", "trader-1"))
        .await
        .unwrap();
    wf.approve(plan.plan_id(), DecisionRequest::new("trader-1"))
        .await
        .unwrap();

    let first = wf
        .execute(
            plan.plan_id(),
            ExecutePlanRequest::new("trader-1").with_correlation_id("corr-exec-1"),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), ExecutionStatus::Partial);
    assert_eq!(first.reports().len(), 2);
    assert!(first.reports()[0].outcome.is_success());
    assert!(matches!(
        first.reports()[1].outcome,
        CommandOutcome::Failure {
            kind: FailureKind::RateLimited,
            ..
        }
    ));
    assert_eq!(executor.calls(), 2);

    let second = wf
        .execute(plan.plan_id(), ExecutePlanRequest::new("trader-2"))
        .await
        .unwrap();
    assert_eq!(second, first);
    assert_eq!(executor.calls(), 2, "replay must not re-run commands");

    let seen = executor.seen.lock().unwrap();
    assert!(seen.iter().all(|c| c.correlation_id.as_str() == "corr-exec-1"));
    assert!(seen.iter().all(|c| c.user_id.as_str() == "trader-1"));
}

#[tokio::test]
async fn test_empty_plan_executes_without_commands() {
    let executor = Arc::new(RecordingExecutor::default());
    let wf = in_memory_workflow(Arc::clone(&executor), Vec::new());

    let plan = wf
        .propose(ProposePlanRequest::new("What is my exposure?", "trader-1"))
        .await
        .unwrap();
    assert!(plan.is_empty());
    wf.approve(plan.plan_id(), DecisionRequest::new("trader-1"))
        .await
        .unwrap();

    let result = wf
        .execute(plan.plan_id(), ExecutePlanRequest::new("trader-1"))
        .await
        .unwrap();
    assert_eq!(result.status(), ExecutionStatus::Completed);
    assert!(result.reports().is_empty());
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_invalid_proposal_persists_nothing() {
    let audit = Arc::new(InMemoryAuditLog::new());
    let wf = workflow(
        Arc::clone(&audit),
        Arc::new(InMemoryExecutionLedger::new()),
        Arc::new(RecordingExecutor::default()),
        vec![ProposedCommand::new("CancelOrder", json!({}))],
    );

    let err = wf
        .propose(ProposePlanRequest::new("Cancel something", "trader-1"))
        .await
        .expect_err("missing orderId must be rejected");
    assert_eq!(err.code(), ErrorCode::InvalidCommand);
    assert!(audit.is_empty());
}

// ============================================
// Concurrency
// ============================================

#[tokio::test]
async fn test_concurrent_decisions_record_one_outcome() {
    let wf = Arc::new(in_memory_workflow(
        Arc::new(RecordingExecutor::default()),
        vec![cancel("O-1")],
    ));
    let plan = wf
        .propose(ProposePlanRequest::new("Cancel O-1", "trader-1"))
        .await
        .unwrap();
    let plan_id = plan.plan_id().clone();

    let mut handles = Vec::new();
    for i in 0..8 {
        let wf = Arc::clone(&wf);
        let plan_id = plan_id.clone();
        handles.push(tokio::spawn(async move {
            let request = DecisionRequest::new(format!("reviewer-{i}"));
            if i % 2 == 0 {
                wf.approve(&plan_id, request).await
            } else {
                wf.reject(&plan_id, request.with_reason("no")).await
            }
        }));
    }

    let mut accepted = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(status) => accepted.push(status),
            Err(e) => assert_eq!(e.code(), ErrorCode::PlanNotPending),
        }
    }
    assert_eq!(accepted.len(), 1);

    let trail = wf.audit_trail(&plan_id).await.unwrap();
    assert_eq!(trail.events.len(), 2);
    assert_eq!(trail.status, accepted[0]);
}

#[tokio::test]
async fn test_concurrent_executions_share_one_run() {
    let executor = Arc::new(RecordingExecutor::slow(Duration::from_millis(50)));
    let wf = Arc::new(in_memory_workflow(
        Arc::clone(&executor),
        vec![cancel("O-1"), cancel("O-2")],
    ));
    let plan = wf
        .propose(ProposePlanRequest::new("Cancel O-1 and O-2", "trader-1"))
        .await
        .unwrap();
    wf.approve(plan.plan_id(), DecisionRequest::new("trader-1"))
        .await
        .unwrap();

    let runs = (0..6).map(|i| {
        let wf = Arc::clone(&wf);
        let plan_id = plan.plan_id().clone();
        async move {
            wf.execute(&plan_id, ExecutePlanRequest::new(format!("trader-{i}")))
                .await
        }
    });
    let results = futures::future::join_all(runs).await;

    let first = results[0].as_ref().expect("execution should succeed");
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }
    assert_eq!(executor.calls(), 2);
    assert_eq!(first.status(), ExecutionStatus::Completed);
}

// ============================================
// Durability
// ============================================

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(RecordingExecutor::default());

    let plan_id: PlanId = {
        let wf = workflow(
            Arc::new(FileAuditLog::new(dir.path())),
            Arc::new(FileExecutionLedger::new(dir.path())),
            Arc::clone(&executor),
            vec![cancel("O-7")],
        );
        let plan = wf
            .propose(ProposePlanRequest::new("Cancel O-7", "trader-1"))
            .await
            .unwrap();
        wf.approve(plan.plan_id(), DecisionRequest::new("risk-1"))
            .await
            .unwrap();
        wf.execute(plan.plan_id(), ExecutePlanRequest::new("trader-1"))
            .await
            .unwrap();
        plan.plan_id().clone()
    };
    assert_eq!(executor.calls(), 1);

    let audit = Arc::new(FileAuditLog::new(dir.path()));
    let reopened = workflow(
        Arc::clone(&audit),
        Arc::new(FileExecutionLedger::new(dir.path())),
        Arc::clone(&executor),
        Vec::new(),
    );

    let status = reopened.status(&plan_id).await.unwrap();
    assert_eq!(status.status, DraftStatus::Approved);
    assert_eq!(status.execution_status, Some(ExecutionStatus::Completed));

    let replayed = reopened
        .execute(&plan_id, ExecutePlanRequest::new("trader-1"))
        .await
        .unwrap();
    assert_eq!(replayed.status(), ExecutionStatus::Completed);
    assert_eq!(executor.calls(), 1, "restart must not re-run commands");

    let err = reopened
        .reject(&plan_id, DecisionRequest::new("risk-2"))
        .await
        .expect_err("decided plan cannot be decided again");
    assert_eq!(err.code(), ErrorCode::PlanNotPending);

    let events = audit.events_for(&plan_id).await.unwrap();
    assert_eq!(DraftStatus::replay(&events), Some(DraftStatus::Approved));
    let view = reopened.plan(&plan_id).await.unwrap();
    assert_eq!(view.plan.query(), "Cancel O-7");
}
