//! Execute Plan Use Case
//!
//! Runs an approved plan's commands at most once. Concurrent callers in this process
//! share one run; callers in other processes are excluded by the ledger claim.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, Shared};
use futures::{FutureExt, StreamExt};
use serde::{Deserialize, Serialize};

use crate::application::dto::ExecutePlanRequest;
use crate::application::ports::{CommandContext, ExecutorRegistry};
use crate::domain::command_plan::{Command, CommandPlan};
use crate::domain::draft_lifecycle::{AuditLogStore, DraftStatus};
use crate::domain::plan_execution::{
    Claim, CommandOutcome, CommandReport, ExecutionLedger, ExecutionResult, ExecutionSchedule,
    FailureKind, LedgerError,
};
use crate::domain::shared::{CorrelationId, PlanId, Timestamp, UserId};
use crate::error::WorkflowError;
use crate::observability;

type RunOutput = Result<ExecutionResult, WorkflowError>;
type SharedRun = Shared<BoxFuture<'static, RunOutput>>;

/// How independent commands are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One command at a time, in declared order.
    #[default]
    Sequential,
    /// Commands without a pending dependency run concurrently, bounded by
    /// `max_in_flight`.
    Concurrent,
}

/// Execution tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Dispatch mode.
    pub dispatch: DispatchMode,
    /// Maximum concurrently running commands in concurrent mode.
    pub max_in_flight: usize,
    /// Time budget for a single command.
    pub command_timeout: Duration,
    /// Warn when the plan's context snapshot is older than this.
    pub stale_context_warn: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Sequential,
            max_in_flight: 4,
            command_timeout: Duration::from_secs(10),
            stale_context_warn: Duration::from_secs(300),
        }
    }
}

/// Use case for executing an approved plan.
pub struct ExecutePlanUseCase<A, L>
where
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    audit: Arc<A>,
    ledger: Arc<L>,
    executors: ExecutorRegistry,
    settings: ExecutionSettings,
    in_flight: Mutex<HashMap<PlanId, SharedRun>>,
}

impl<A, L> ExecutePlanUseCase<A, L>
where
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    /// Create a new ExecutePlanUseCase.
    pub fn new(
        audit: Arc<A>,
        ledger: Arc<L>,
        executors: ExecutorRegistry,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            audit,
            ledger,
            executors,
            settings,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Execute the use case.
    ///
    /// Returns the stored result unchanged if the plan already ran.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotApproved` if the plan has no recorded approval,
    /// `ExecutionInProgress` if another process holds the claim, and
    /// `ResultWriteFailed` if commands ran but the result could not be stored.
    pub async fn execute(
        &self,
        plan_id: &PlanId,
        request: ExecutePlanRequest,
    ) -> Result<ExecutionResult, WorkflowError> {
        let user_id = request.user();
        if user_id.as_str().is_empty() {
            return Err(WorkflowError::invalid_request("userId must not be empty"));
        }

        let plan = self.load_approved(plan_id).await?;

        if let Some(result) = self.ledger.find(plan_id).await.map_err(ledger_error)? {
            tracing::debug!(plan_id = %plan_id, "Returning stored execution result");
            observability::record_execution_replay();
            return Ok(result);
        }

        let run = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight
                .entry(plan_id.clone())
                .or_insert_with(|| self.spawn_run(plan, user_id, request.correlation()))
                .clone()
        };

        let result = run.await;

        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(plan_id);

        result
    }

    async fn load_approved(&self, plan_id: &PlanId) -> Result<CommandPlan, WorkflowError> {
        let not_approved = || WorkflowError::PlanNotApproved {
            plan_id: plan_id.to_string(),
        };

        let events = self
            .audit
            .events_for(plan_id)
            .await
            .map_err(|e| WorkflowError::AuditReadFailed {
                message: e.to_string(),
            })?;

        if DraftStatus::replay(&events) != Some(DraftStatus::Approved) {
            return Err(not_approved());
        }

        events
            .iter()
            .find_map(|e| e.plan().cloned())
            .ok_or_else(not_approved)
    }

    /// Start the run on its own task so it completes even if every caller goes away.
    fn spawn_run(
        &self,
        plan: CommandPlan,
        user_id: UserId,
        correlation_id: CorrelationId,
    ) -> SharedRun {
        let run = PlanRun {
            ledger: Arc::clone(&self.ledger),
            executors: self.executors.clone(),
            settings: self.settings.clone(),
            plan,
            user_id,
            correlation_id,
        };
        let plan_id = run.plan.plan_id().clone();
        let handle = tokio::spawn(run.run());

        async move {
            handle.await.unwrap_or_else(|e| {
                tracing::error!(plan_id = %plan_id, error = %e, "Execution task aborted");
                Err(WorkflowError::ResultWriteFailed {
                    plan_id: plan_id.to_string(),
                    message: format!("execution task aborted: {e}"),
                })
            })
        }
        .boxed()
        .shared()
    }
}

fn ledger_error(err: LedgerError) -> WorkflowError {
    match err {
        LedgerError::ReadFailed { message } => WorkflowError::AuditReadFailed { message },
        LedgerError::WriteFailed { message } => WorkflowError::AuditWriteFailed { message },
    }
}

/// One claimed execution of one plan.
struct PlanRun<L: ExecutionLedger> {
    ledger: Arc<L>,
    executors: ExecutorRegistry,
    settings: ExecutionSettings,
    plan: CommandPlan,
    user_id: UserId,
    correlation_id: CorrelationId,
}

impl<L: ExecutionLedger> PlanRun<L> {
    async fn run(self) -> RunOutput {
        let plan_id = self.plan.plan_id().clone();

        match self.ledger.try_claim(&plan_id).await.map_err(ledger_error)? {
            Claim::Completed(result) => {
                observability::record_execution_replay();
                return Ok(*result);
            }
            Claim::InProgress => {
                tracing::warn!(plan_id = %plan_id, "Execution claim held elsewhere");
                return Err(WorkflowError::ExecutionInProgress {
                    plan_id: plan_id.to_string(),
                });
            }
            Claim::Acquired => {}
        }

        self.warn_if_context_stale();

        tracing::info!(
            plan_id = %plan_id,
            user_id = %self.user_id,
            correlation_id = %self.correlation_id,
            commands = self.plan.commands().len(),
            dispatch = ?self.settings.dispatch,
            "Executing plan"
        );

        let started_at = Timestamp::now();
        let clock = Instant::now();
        let outcomes = match self.settings.dispatch {
            DispatchMode::Sequential => self.run_sequential().await,
            DispatchMode::Concurrent => self.run_concurrent().await,
        };

        let reports = self
            .plan
            .commands()
            .iter()
            .zip(outcomes)
            .enumerate()
            .map(|(index, (command, outcome))| CommandReport {
                index,
                command: command.kind(),
                outcome: outcome.unwrap_or_else(|| {
                    CommandOutcome::failure(FailureKind::Internal, "command was never dispatched")
                }),
            })
            .collect();

        let result = ExecutionResult::new(
            plan_id.clone(),
            self.user_id.clone(),
            self.correlation_id.clone(),
            started_at,
            reports,
        );

        if let Err(e) = self.ledger.record(&result).await {
            tracing::error!(
                plan_id = %plan_id,
                correlation_id = %self.correlation_id,
                error = %e,
                outcomes = %serde_json::to_string(result.reports()).unwrap_or_default(),
                "Execution result could not be stored; plan will not be re-run"
            );
            return Err(WorkflowError::ResultWriteFailed {
                plan_id: plan_id.to_string(),
                message: e.to_string(),
            });
        }

        let status = result.status();
        tracing::info!(
            plan_id = %plan_id,
            correlation_id = %self.correlation_id,
            status = %status,
            duration_ms = result.duration_ms(),
            "Plan executed"
        );
        observability::record_execution(status.as_str(), clock.elapsed().as_secs_f64());

        Ok(result)
    }

    async fn run_sequential(&self) -> Vec<Option<CommandOutcome>> {
        let commands = self.plan.commands();
        let mut outcomes: Vec<Option<CommandOutcome>> = vec![None; commands.len()];

        for (index, command) in commands.iter().enumerate() {
            let outcome = match ExecutionSchedule::blocker(command, &outcomes) {
                Some(blocked_by) => self.skip(index, command, blocked_by),
                None => self.dispatch(index, command).await,
            };
            if let Some(slot) = outcomes.get_mut(index) {
                *slot = Some(outcome);
            }
        }

        outcomes
    }

    async fn run_concurrent(&self) -> Vec<Option<CommandOutcome>> {
        let commands = self.plan.commands();
        let schedule = ExecutionSchedule::build(commands);
        let mut outcomes: Vec<Option<CommandOutcome>> = vec![None; commands.len()];

        for level in schedule.levels() {
            let mut runnable = Vec::with_capacity(level.len());
            for &index in level {
                let Some(command) = commands.get(index) else {
                    continue;
                };
                match ExecutionSchedule::blocker(command, &outcomes) {
                    Some(blocked_by) => {
                        let outcome = self.skip(index, command, blocked_by);
                        if let Some(slot) = outcomes.get_mut(index) {
                            *slot = Some(outcome);
                        }
                    }
                    None => runnable.push(index),
                }
            }

            let finished: Vec<(usize, CommandOutcome)> = futures::stream::iter(runnable)
                .map(|index| self.dispatch_at(index))
                .buffer_unordered(self.settings.max_in_flight.max(1))
                .collect()
                .await;

            for (index, outcome) in finished {
                if let Some(slot) = outcomes.get_mut(index) {
                    *slot = Some(outcome);
                }
            }
        }

        outcomes
    }

    fn dispatch_at(&self, index: usize) -> BoxFuture<'_, (usize, CommandOutcome)> {
        async move {
            let outcome = match self.plan.commands().get(index) {
                Some(command) => self.dispatch(index, command).await,
                None => CommandOutcome::failure(FailureKind::Internal, "no command at position"),
            };
            (index, outcome)
        }
        .boxed()
    }

    async fn dispatch(&self, index: usize, command: &Command) -> CommandOutcome {
        let kind = command.kind();
        let outcome = match self.executors.resolve(kind) {
            None => CommandOutcome::failure(
                FailureKind::UnsupportedCommand,
                format!("no executor registered for {kind}"),
            ),
            Some(executor) => {
                let context = CommandContext {
                    plan_id: self.plan.plan_id().clone(),
                    user_id: self.user_id.clone(),
                    correlation_id: self.correlation_id.clone(),
                    index,
                };
                let timeout = self.settings.command_timeout;
                match tokio::time::timeout(timeout, executor.run(command, &context)).await {
                    Ok(Ok(result)) => CommandOutcome::Success { result },
                    Ok(Err(failure)) => CommandOutcome::failure(failure.kind, failure.message),
                    Err(_) => CommandOutcome::failure(
                        FailureKind::Timeout,
                        format!("command did not complete within {}ms", timeout.as_millis()),
                    ),
                }
            }
        };

        let failure_kind = match &outcome {
            CommandOutcome::Failure { kind, message } => {
                tracing::warn!(
                    plan_id = %self.plan.plan_id(),
                    correlation_id = %self.correlation_id,
                    index,
                    command = %command.kind(),
                    failure = %kind,
                    message = %message,
                    "Command failed"
                );
                kind.as_str()
            }
            _ => {
                tracing::debug!(
                    plan_id = %self.plan.plan_id(),
                    index,
                    command = %command.kind(),
                    "Command succeeded"
                );
                ""
            }
        };
        observability::record_command_outcome(kind.as_str(), outcome.label(), failure_kind);

        outcome
    }

    fn skip(&self, index: usize, command: &Command, blocked_by: usize) -> CommandOutcome {
        tracing::info!(
            plan_id = %self.plan.plan_id(),
            index,
            blocked_by,
            command = %command.kind(),
            "Skipping command, dependency did not succeed"
        );
        observability::record_command_outcome(command.kind().as_str(), "skipped", "");
        CommandOutcome::Skipped { blocked_by }
    }

    fn warn_if_context_stale(&self) {
        let Some(context) = self.plan.context() else {
            return;
        };
        let age = context.age_secs_at(Timestamp::now());
        if age > self.settings.stale_context_warn.as_secs() {
            tracing::warn!(
                plan_id = %self.plan.plan_id(),
                snapshot_id = %context.snapshot_id,
                age_secs = age,
                "Executing plan against a stale context snapshot"
            );
        }
    }
}
