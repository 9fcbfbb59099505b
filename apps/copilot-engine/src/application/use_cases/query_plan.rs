//! Query Plan Use Case
//!
//! Read-only views over the audit log and execution ledger.

use std::sync::Arc;

use crate::application::dto::{AuditTrailDto, ExecutionResultDto, PlanStatusDto, PlanView};
use crate::domain::draft_lifecycle::{AuditLogStore, DraftEvent, DraftStatus};
use crate::domain::plan_execution::{ExecutionLedger, ExecutionResult};
use crate::domain::shared::PlanId;
use crate::error::WorkflowError;

/// Use case for reading plan state.
pub struct QueryPlanUseCase<A, L>
where
    A: AuditLogStore,
    L: ExecutionLedger,
{
    audit: Arc<A>,
    ledger: Arc<L>,
}

impl<A, L> QueryPlanUseCase<A, L>
where
    A: AuditLogStore,
    L: ExecutionLedger,
{
    /// Create a new QueryPlanUseCase.
    pub const fn new(audit: Arc<A>, ledger: Arc<L>) -> Self {
        Self { audit, ledger }
    }

    /// Lifecycle status of a plan, derived by replaying its events.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotFound` if no proposal exists.
    pub async fn status(&self, plan_id: &PlanId) -> Result<PlanStatusDto, WorkflowError> {
        let (_, status) = self.history(plan_id).await?;
        let execution = self.execution(plan_id).await?;
        Ok(PlanStatusDto {
            plan_id: plan_id.to_string(),
            status,
            execution_status: execution.as_ref().map(ExecutionResult::status),
        })
    }

    /// The plan as proposed, with its status and execution result.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotFound` if no proposal exists.
    pub async fn plan(&self, plan_id: &PlanId) -> Result<PlanView, WorkflowError> {
        let (events, status) = self.history(plan_id).await?;
        let plan = events
            .iter()
            .find_map(|e| e.plan().cloned())
            .ok_or_else(|| not_found(plan_id))?;
        let execution = self.execution(plan_id).await?;
        Ok(PlanView {
            plan,
            status,
            execution: execution.as_ref().map(ExecutionResultDto::from_result),
        })
    }

    /// Every event recorded for a plan, plus its execution result.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotFound` if no proposal exists.
    pub async fn audit_trail(&self, plan_id: &PlanId) -> Result<AuditTrailDto, WorkflowError> {
        let (events, status) = self.history(plan_id).await?;
        let execution = self.execution(plan_id).await?;
        Ok(AuditTrailDto {
            plan_id: plan_id.to_string(),
            status,
            events,
            execution: execution.as_ref().map(ExecutionResultDto::from_result),
        })
    }

    async fn history(
        &self,
        plan_id: &PlanId,
    ) -> Result<(Vec<DraftEvent>, DraftStatus), WorkflowError> {
        let events = self
            .audit
            .events_for(plan_id)
            .await
            .map_err(|e| WorkflowError::AuditReadFailed {
                message: e.to_string(),
            })?;
        let status = DraftStatus::replay(&events).ok_or_else(|| not_found(plan_id))?;
        Ok((events, status))
    }

    async fn execution(&self, plan_id: &PlanId) -> Result<Option<ExecutionResult>, WorkflowError> {
        self.ledger
            .find(plan_id)
            .await
            .map_err(|e| WorkflowError::AuditReadFailed {
                message: e.to_string(),
            })
    }
}

fn not_found(plan_id: &PlanId) -> WorkflowError {
    WorkflowError::PlanNotFound {
        plan_id: plan_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command_plan::{CandidatePlan, CommandPlan};
    use crate::domain::shared::{CorrelationId, UserId};
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::{InMemoryAuditLog, InMemoryExecutionLedger};

    #[tokio::test]
    async fn unknown_plan_is_not_found() {
        let uc = QueryPlanUseCase::new(
            Arc::new(InMemoryAuditLog::new()),
            Arc::new(InMemoryExecutionLedger::new()),
        );
        let err = uc.status(&PlanId::new("missing")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PlanNotFound);
    }

    #[tokio::test]
    async fn audit_trail_lists_events_in_order() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let uc = QueryPlanUseCase::new(Arc::clone(&audit), Arc::new(InMemoryExecutionLedger::new()));

        let plan = CommandPlan::propose(CandidatePlan::new("q", UserId::new("u1"))).unwrap();
        let id = plan.plan_id().clone();
        audit
            .append(&DraftEvent::proposed(plan.clone(), CorrelationId::generate()))
            .await
            .unwrap();
        audit
            .append(&DraftEvent::rejected(
                id.clone(),
                UserId::new("u2"),
                Some("no".to_string()),
                CorrelationId::generate(),
            ))
            .await
            .unwrap();

        let trail = uc.audit_trail(&id).await.unwrap();
        assert_eq!(trail.status, DraftStatus::Rejected);
        assert_eq!(trail.events.len(), 2);
        assert_eq!(trail.events[0].event_type(), "AI_DRAFT_PROPOSED");
        assert!(trail.execution.is_none());

        let view = uc.plan(&id).await.unwrap();
        assert_eq!(view.plan, plan);
        assert_eq!(uc.status(&id).await.unwrap().execution_status, None);
    }
}
