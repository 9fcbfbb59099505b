//! Plan Workflow facade.
//!
//! Propose, approve or reject, execute, and inspect command plans. Every operation
//! takes an explicit plan id; the workflow holds no per-caller session state.

use std::sync::Arc;
use std::time::Duration;

use crate::application::dto::{
    AuditTrailDto, DecisionRequest, ExecutePlanRequest, PlanStatusDto, PlanView,
    ProposePlanRequest,
};
use crate::application::ports::{ContextProviderPort, ExecutorRegistry, ReasoningPort};
use crate::application::use_cases::{
    DecidePlanUseCase, ExecutePlanUseCase, ExecutionSettings, ProposePlanUseCase,
    QueryPlanUseCase,
};
use crate::domain::command_plan::CommandPlan;
use crate::domain::draft_lifecycle::{AuditLogStore, DraftStatus};
use crate::domain::plan_execution::{ExecutionLedger, ExecutionResult};
use crate::domain::shared::PlanId;
use crate::error::WorkflowError;

/// Workflow tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Budget for one reasoning call.
    pub reasoning_timeout: Duration,
    /// Longest accepted rejection reason, in characters.
    pub max_reject_reason_len: usize,
    /// Execution tuning.
    pub execution: ExecutionSettings,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            reasoning_timeout: Duration::from_secs(30),
            max_reject_reason_len: 1000,
            execution: ExecutionSettings::default(),
        }
    }
}

/// The plan workflow.
pub struct PlanWorkflow<R, C, A, L>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    proposer: ProposePlanUseCase<R, C, A>,
    gate: DecidePlanUseCase<A>,
    executor: ExecutePlanUseCase<A, L>,
    query: QueryPlanUseCase<A, L>,
}

impl<R, C, A, L> PlanWorkflow<R, C, A, L>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    /// Wire the workflow from its ports.
    pub fn new(
        reasoning: Arc<R>,
        context: Arc<C>,
        audit: Arc<A>,
        ledger: Arc<L>,
        executors: ExecutorRegistry,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            proposer: ProposePlanUseCase::new(
                reasoning,
                context,
                Arc::clone(&audit),
                settings.reasoning_timeout,
            ),
            gate: DecidePlanUseCase::new(Arc::clone(&audit), settings.max_reject_reason_len),
            executor: ExecutePlanUseCase::new(
                Arc::clone(&audit),
                Arc::clone(&ledger),
                executors,
                settings.execution,
            ),
            query: QueryPlanUseCase::new(audit, ledger),
        }
    }

    /// Propose a plan for a natural-language request.
    ///
    /// # Errors
    ///
    /// See [`ProposePlanUseCase::execute`].
    pub async fn propose(&self, request: ProposePlanRequest) -> Result<CommandPlan, WorkflowError> {
        self.proposer.execute(request).await
    }

    /// Approve a pending plan.
    ///
    /// # Errors
    ///
    /// See [`DecidePlanUseCase::approve`].
    pub async fn approve(
        &self,
        plan_id: &PlanId,
        request: DecisionRequest,
    ) -> Result<DraftStatus, WorkflowError> {
        self.gate.approve(plan_id, request).await
    }

    /// Reject a pending plan.
    ///
    /// # Errors
    ///
    /// See [`DecidePlanUseCase::reject`].
    pub async fn reject(
        &self,
        plan_id: &PlanId,
        request: DecisionRequest,
    ) -> Result<DraftStatus, WorkflowError> {
        self.gate.reject(plan_id, request).await
    }

    /// Execute an approved plan, at most once.
    ///
    /// # Errors
    ///
    /// See [`ExecutePlanUseCase::execute`].
    pub async fn execute(
        &self,
        plan_id: &PlanId,
        request: ExecutePlanRequest,
    ) -> Result<ExecutionResult, WorkflowError> {
        self.executor.execute(plan_id, request).await
    }

    /// Derived status of a plan.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotFound` for an unknown plan.
    pub async fn status(&self, plan_id: &PlanId) -> Result<PlanStatusDto, WorkflowError> {
        self.query.status(plan_id).await
    }

    /// A plan with its status and execution result.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotFound` for an unknown plan.
    pub async fn plan(&self, plan_id: &PlanId) -> Result<PlanView, WorkflowError> {
        self.query.plan(plan_id).await
    }

    /// Full event history of a plan.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotFound` for an unknown plan.
    pub async fn audit_trail(&self, plan_id: &PlanId) -> Result<AuditTrailDto, WorkflowError> {
        self.query.audit_trail(plan_id).await
    }
}
