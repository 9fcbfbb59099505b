//! Decide Plan Use Case
//!
//! The approval gate: the only place a plan becomes executable.

use std::sync::Arc;

use crate::application::dto::DecisionRequest;
use crate::domain::draft_lifecycle::{AuditError, AuditLogStore, DraftEvent, DraftStatus};
use crate::domain::shared::PlanId;
use crate::error::WorkflowError;
use crate::observability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

impl Decision {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Use case for approving or rejecting a pending plan.
///
/// Both transitions are terminal and mutually exclusive. Races between decisions are
/// settled by the audit store's conditional append.
pub struct DecidePlanUseCase<A>
where
    A: AuditLogStore,
{
    audit: Arc<A>,
    max_reason_len: usize,
}

impl<A> DecidePlanUseCase<A>
where
    A: AuditLogStore,
{
    /// Create a new DecidePlanUseCase.
    pub const fn new(audit: Arc<A>, max_reason_len: usize) -> Self {
        Self {
            audit,
            max_reason_len,
        }
    }

    /// Approve a pending plan.
    ///
    /// # Errors
    ///
    /// Returns `PlanNotPending` if the plan is unknown or already decided,
    /// `AuditWriteFailed` if the approval could not be persisted.
    pub async fn approve(
        &self,
        plan_id: &PlanId,
        request: DecisionRequest,
    ) -> Result<DraftStatus, WorkflowError> {
        self.decide(plan_id, request, Decision::Approve).await
    }

    /// Reject a pending plan with an optional reason.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the reason is too long, `PlanNotPending` if the plan
    /// is unknown or already decided, `AuditWriteFailed` if the rejection could not be
    /// persisted.
    pub async fn reject(
        &self,
        plan_id: &PlanId,
        request: DecisionRequest,
    ) -> Result<DraftStatus, WorkflowError> {
        self.decide(plan_id, request, Decision::Reject).await
    }

    async fn decide(
        &self,
        plan_id: &PlanId,
        request: DecisionRequest,
        decision: Decision,
    ) -> Result<DraftStatus, WorkflowError> {
        let result = self.try_decide(plan_id, request, decision).await;
        let outcome = match &result {
            Ok(_) => "accepted",
            Err(e) => e.code().reason(),
        };
        observability::record_decision(decision.as_str(), outcome);
        result
    }

    async fn try_decide(
        &self,
        plan_id: &PlanId,
        request: DecisionRequest,
        decision: Decision,
    ) -> Result<DraftStatus, WorkflowError> {
        let user_id = request.user();
        let correlation_id = request.correlation();
        if user_id.as_str().is_empty() {
            return Err(WorkflowError::invalid_request("userId must not be empty"));
        }

        let not_pending = || WorkflowError::PlanNotPending {
            plan_id: plan_id.to_string(),
        };

        let status = self
            .audit
            .status(plan_id)
            .await
            .map_err(|e| WorkflowError::AuditReadFailed {
                message: e.to_string(),
            })?;
        if status != Some(DraftStatus::Pending) {
            return Err(not_pending());
        }

        let (event, next) = match decision {
            Decision::Approve => (
                DraftEvent::approved(plan_id.clone(), user_id.clone(), correlation_id.clone()),
                DraftStatus::Approved,
            ),
            Decision::Reject => {
                let reason = self.normalize_reason(request.reason)?;
                (
                    DraftEvent::rejected(
                        plan_id.clone(),
                        user_id.clone(),
                        reason,
                        correlation_id.clone(),
                    ),
                    DraftStatus::Rejected,
                )
            }
        };

        self.audit.append(&event).await.map_err(|e| match e {
            AuditError::Conflict { .. } => not_pending(),
            AuditError::ReadFailed { message } => WorkflowError::AuditReadFailed { message },
            AuditError::WriteFailed { message } => WorkflowError::AuditWriteFailed { message },
        })?;

        tracing::info!(
            plan_id = %plan_id,
            user_id = %user_id,
            correlation_id = %correlation_id,
            status = %next,
            "Plan decided"
        );

        Ok(next)
    }

    fn normalize_reason(&self, reason: Option<String>) -> Result<Option<String>, WorkflowError> {
        let Some(reason) = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };
        if reason.chars().count() > self.max_reason_len {
            return Err(WorkflowError::invalid_request(format!(
                "reason must be at most {} characters",
                self.max_reason_len
            )));
        }
        Ok(Some(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command_plan::{CandidatePlan, CommandPlan};
    use crate::domain::draft_lifecycle::DraftEventPayload;
    use crate::domain::shared::{CorrelationId, UserId};
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::InMemoryAuditLog;

    async fn pending_plan(audit: &InMemoryAuditLog) -> PlanId {
        let plan = CommandPlan::propose(CandidatePlan::new("q", UserId::new("u1"))).unwrap();
        let id = plan.plan_id().clone();
        audit
            .append(&DraftEvent::proposed(plan, CorrelationId::generate()))
            .await
            .unwrap();
        id
    }

    fn use_case() -> (DecidePlanUseCase<InMemoryAuditLog>, Arc<InMemoryAuditLog>) {
        let audit = Arc::new(InMemoryAuditLog::new());
        (DecidePlanUseCase::new(Arc::clone(&audit), 20), audit)
    }

    #[tokio::test]
    async fn approve_pending_plan() {
        let (uc, audit) = use_case();
        let id = pending_plan(&audit).await;

        let status = uc.approve(&id, DecisionRequest::new("u1")).await.unwrap();

        assert_eq!(status, DraftStatus::Approved);
        assert_eq!(audit.status(&id).await.unwrap(), Some(status));
    }

    #[tokio::test]
    async fn second_decision_is_not_pending() {
        let (uc, audit) = use_case();
        let id = pending_plan(&audit).await;
        uc.reject(&id, DecisionRequest::new("u1")).await.unwrap();

        let err = uc.approve(&id, DecisionRequest::new("u2")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PlanNotPending);
        assert_eq!(audit.status(&id).await.unwrap(), Some(DraftStatus::Rejected));
    }

    #[tokio::test]
    async fn unknown_plan_is_not_pending() {
        let (uc, _) = use_case();
        let err = uc
            .approve(&PlanId::new("missing"), DecisionRequest::new("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PlanNotPending);
    }

    #[tokio::test]
    async fn reject_reason_is_trimmed_and_blank_dropped() {
        let (uc, audit) = use_case();
        let id = pending_plan(&audit).await;
        uc.reject(&id, DecisionRequest::new("u1").with_reason("  too broad "))
            .await
            .unwrap();
        let events = audit.events_for(&id).await.unwrap();
        assert_eq!(
            events[1].payload,
            DraftEventPayload::Rejected {
                reason: Some("too broad".to_string())
            }
        );

        let id = pending_plan(&audit).await;
        uc.reject(&id, DecisionRequest::new("u1").with_reason("   "))
            .await
            .unwrap();
        let events = audit.events_for(&id).await.unwrap();
        assert_eq!(events[1].payload, DraftEventPayload::Rejected { reason: None });
    }

    #[tokio::test]
    async fn overlong_reason_leaves_plan_pending() {
        let (uc, audit) = use_case();
        let id = pending_plan(&audit).await;
        let err = uc
            .reject(&id, DecisionRequest::new("u1").with_reason("x".repeat(21)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(audit.status(&id).await.unwrap(), Some(DraftStatus::Pending));
    }

    #[tokio::test]
    async fn blank_user_is_invalid() {
        let (uc, audit) = use_case();
        let id = pending_plan(&audit).await;
        let err = uc.approve(&id, DecisionRequest::new(" ")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
