//! Propose Plan Use Case

use std::sync::Arc;
use std::time::Duration;

use crate::application::dto::ProposePlanRequest;
use crate::application::ports::{
    ContextProviderPort, ReasoningError, ReasoningOutput, ReasoningPort, ReasoningRequest,
};
use crate::domain::command_plan::{CandidatePlan, CommandPlan, ContextSnapshot};
use crate::domain::draft_lifecycle::{AuditLogStore, DraftEvent};
use crate::domain::shared::CorrelationId;
use crate::error::WorkflowError;
use crate::observability;

/// Use case for turning a request into a persisted, pending plan.
///
/// Proposal never touches downstream domain systems. A plan is returned only after
/// its proposal event is durable.
pub struct ProposePlanUseCase<R, C, A>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore,
{
    reasoning: Arc<R>,
    context: Arc<C>,
    audit: Arc<A>,
    reasoning_timeout: Duration,
}

impl<R, C, A> ProposePlanUseCase<R, C, A>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore,
{
    /// Create a new ProposePlanUseCase.
    pub const fn new(
        reasoning: Arc<R>,
        context: Arc<C>,
        audit: Arc<A>,
        reasoning_timeout: Duration,
    ) -> Self {
        Self {
            reasoning,
            context,
            audit,
            reasoning_timeout,
        }
    }

    /// Execute the use case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a blank query or user, `ReasoningUnavailable` or
    /// `ReasoningTimeout` when the reasoning call fails, `InvalidCommand` when a
    /// proposed command is invalid, and `AuditWriteFailed` when the proposal event
    /// could not be persisted.
    pub async fn execute(&self, request: ProposePlanRequest) -> Result<CommandPlan, WorkflowError> {
        let correlation_id = request.correlation();
        let result = self.propose(request, &correlation_id).await;

        if let Err(e) = &result {
            tracing::warn!(
                correlation_id = %correlation_id,
                code = %e.code(),
                error = %e,
                "Plan proposal failed"
            );
            observability::record_proposal_failure(e.code().reason());
        }
        result
    }

    async fn propose(
        &self,
        request: ProposePlanRequest,
        correlation_id: &CorrelationId,
    ) -> Result<CommandPlan, WorkflowError> {
        let user_id = request.user();
        if request.query.trim().is_empty() {
            return Err(WorkflowError::invalid_request("query must not be empty"));
        }
        if user_id.as_str().is_empty() {
            return Err(WorkflowError::invalid_request("userId must not be empty"));
        }

        let context = match request.context {
            Some(context) => Some(context),
            None => self.consult_context(correlation_id).await,
        };

        let reasoning_request = ReasoningRequest {
            query: request.query.trim().to_string(),
            user_id,
            context,
        };
        let output = self.reason(&reasoning_request).await?;

        let ReasoningRequest {
            query,
            user_id,
            context,
        } = reasoning_request;
        let plan = CommandPlan::propose(CandidatePlan {
            query,
            user_id,
            context,
            commands: output.commands,
            rationale: output.rationale,
            assumptions: output.assumptions,
            expected_events: output.expected_events,
            confidence: output.confidence,
            route: output.route,
            query_params: output.query_params,
        })?;

        let event = DraftEvent::proposed(plan.clone(), correlation_id.clone());
        self.audit
            .append(&event)
            .await
            .map_err(|e| WorkflowError::AuditWriteFailed {
                message: e.to_string(),
            })?;

        tracing::info!(
            plan_id = %plan.plan_id(),
            user_id = %plan.user_id(),
            correlation_id = %correlation_id,
            commands = plan.commands().len(),
            "Plan proposed"
        );
        observability::record_plan_proposed(plan.commands().len(), plan.context().is_some());

        Ok(plan)
    }

    async fn reason(&self, request: &ReasoningRequest) -> Result<ReasoningOutput, WorkflowError> {
        let timeout_ms = u64::try_from(self.reasoning_timeout.as_millis()).unwrap_or(u64::MAX);

        match tokio::time::timeout(self.reasoning_timeout, self.reasoning.reason(request)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(ReasoningError::Unavailable { message })) => {
                Err(WorkflowError::ReasoningUnavailable { message })
            }
            Ok(Err(ReasoningError::Timeout { timeout_ms })) => {
                Err(WorkflowError::ReasoningTimeout { timeout_ms })
            }
            Err(_) => Err(WorkflowError::ReasoningTimeout { timeout_ms }),
        }
    }

    /// Best-effort context lookup. Failures never fail the proposal.
    async fn consult_context(&self, correlation_id: &CorrelationId) -> Option<ContextSnapshot> {
        if !self.context.health().await {
            tracing::debug!(
                correlation_id = %correlation_id,
                "Context provider unhealthy, proposing without context"
            );
            return None;
        }

        match self.context.snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "Failed to fetch context snapshot, proposing without context"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ContextError, NoContextProvider};
    use crate::domain::command_plan::{CommandKind, ProposedCommand};
    use crate::domain::draft_lifecycle::{AuditError, DraftStatus};
    use crate::domain::shared::PlanId;
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::InMemoryAuditLog;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Reasoning mock that returns a fixed result and records what it saw.
    struct MockReasoning {
        result: Result<ReasoningOutput, ReasoningError>,
        seen: Mutex<Vec<ReasoningRequest>>,
        delay: Option<Duration>,
    }

    impl MockReasoning {
        fn returning(result: Result<ReasoningOutput, ReasoningError>) -> Self {
            Self {
                result,
                seen: Mutex::new(Vec::new()),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl ReasoningPort for MockReasoning {
        async fn reason(
            &self,
            request: &ReasoningRequest,
        ) -> Result<ReasoningOutput, ReasoningError> {
            self.seen.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result.clone()
        }
    }

    struct HealthyContext;

    #[async_trait]
    impl ContextProviderPort for HealthyContext {
        async fn snapshot(&self) -> Result<ContextSnapshot, ContextError> {
            Ok(ContextSnapshot::capture(json!({"openOrders": 2})))
        }

        async fn health(&self) -> bool {
            true
        }
    }

    struct BrokenContext;

    #[async_trait]
    impl ContextProviderPort for BrokenContext {
        async fn snapshot(&self) -> Result<ContextSnapshot, ContextError> {
            Err(ContextError::Unavailable {
                message: "boom".to_string(),
            })
        }

        async fn health(&self) -> bool {
            true
        }
    }

    struct FailingAudit;

    #[async_trait]
    impl AuditLogStore for FailingAudit {
        async fn append(&self, _event: &DraftEvent) -> Result<(), AuditError> {
            Err(AuditError::write("disk full"))
        }

        async fn events_for(&self, _plan_id: &PlanId) -> Result<Vec<DraftEvent>, AuditError> {
            Ok(Vec::new())
        }
    }

    fn cancel_two() -> ReasoningOutput {
        ReasoningOutput {
            commands: vec![
                ProposedCommand::new("cancel-order", json!({"orderId": "O-1"})),
                ProposedCommand::new("cancel-order", json!({"orderId": "O-2"})),
            ],
            confidence: 0.9,
            ..ReasoningOutput::default()
        }
    }

    fn use_case<C: ContextProviderPort>(
        reasoning: MockReasoning,
        context: C,
    ) -> (ProposePlanUseCase<MockReasoning, C, InMemoryAuditLog>, Arc<InMemoryAuditLog>) {
        let audit = Arc::new(InMemoryAuditLog::new());
        let uc = ProposePlanUseCase::new(
            Arc::new(reasoning),
            Arc::new(context),
            Arc::clone(&audit),
            Duration::from_secs(5),
        );
        (uc, audit)
    }

    #[tokio::test]
    async fn proposal_persists_pending_plan() {
        let (uc, audit) = use_case(MockReasoning::returning(Ok(cancel_two())), NoContextProvider);

        let plan = uc
            .execute(ProposePlanRequest::new("cancel all orders over $1M", "u1"))
            .await
            .unwrap();

        assert_eq!(plan.commands().len(), 2);
        assert!(plan.commands().iter().all(|c| c.kind() == CommandKind::CancelOrder));
        assert_eq!(audit.status(plan.plan_id()).await.unwrap(), Some(DraftStatus::Pending));

        let events = audit.events_for(plan.plan_id()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].plan(), Some(&plan));
    }

    #[tokio::test]
    async fn blank_query_is_invalid_request() {
        let (uc, _) = use_case(MockReasoning::returning(Ok(cancel_two())), NoContextProvider);
        let err = uc.execute(ProposePlanRequest::new("  ", "u1")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_and_not_persisted() {
        let output = ReasoningOutput {
            commands: vec![ProposedCommand::new("liquidate-everything", json!({}))],
            ..ReasoningOutput::default()
        };
        let (uc, audit) = use_case(MockReasoning::returning(Ok(output)), NoContextProvider);

        let err = uc.execute(ProposePlanRequest::new("sell it all", "u1")).await.unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidCommand { index: Some(0), .. }));
        assert!(audit.is_empty());
    }

    #[tokio::test]
    async fn reasoning_errors_surface_unchanged() {
        let (uc, _) = use_case(
            MockReasoning::returning(Err(ReasoningError::Unavailable {
                message: "503".to_string(),
            })),
            NoContextProvider,
        );
        let err = uc.execute(ProposePlanRequest::new("q", "u1")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ReasoningUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reasoning_times_out() {
        let mut reasoning = MockReasoning::returning(Ok(cancel_two()));
        reasoning.delay = Some(Duration::from_secs(60));
        let (uc, audit) = use_case(reasoning, NoContextProvider);

        let err = uc.execute(ProposePlanRequest::new("q", "u1")).await.unwrap_err();

        assert_eq!(err, WorkflowError::ReasoningTimeout { timeout_ms: 5000 });
        assert!(audit.is_empty());
    }

    #[tokio::test]
    async fn audit_failure_returns_no_plan() {
        let uc = ProposePlanUseCase::new(
            Arc::new(MockReasoning::returning(Ok(cancel_two()))),
            Arc::new(NoContextProvider),
            Arc::new(FailingAudit),
            Duration::from_secs(5),
        );
        let err = uc.execute(ProposePlanRequest::new("q", "u1")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AuditWriteFailed);
    }

    #[tokio::test]
    async fn context_provider_is_consulted_when_no_context_given() {
        let (uc, _) = use_case(MockReasoning::returning(Ok(cancel_two())), HealthyContext);
        let plan = uc.execute(ProposePlanRequest::new("q", "u1")).await.unwrap();
        assert!(plan.context().is_some());
        assert_eq!(uc.reasoning.seen.lock().unwrap()[0].context, plan.context().cloned());
    }

    #[tokio::test]
    async fn given_context_wins_over_provider() {
        let (uc, _) = use_case(MockReasoning::returning(Ok(cancel_two())), HealthyContext);
        let given = ContextSnapshot::capture(json!({"given": true}));
        let plan = uc
            .execute(ProposePlanRequest::new("q", "u1").with_context(given.clone()))
            .await
            .unwrap();
        assert_eq!(plan.context(), Some(&given));
    }

    #[tokio::test]
    async fn context_failure_does_not_fail_proposal() {
        let (uc, _) = use_case(MockReasoning::returning(Ok(cancel_two())), BrokenContext);
        let plan = uc.execute(ProposePlanRequest::new("q", "u1")).await.unwrap();
        assert!(plan.context().is_none());
    }

    #[tokio::test]
    async fn correlation_id_is_recorded_on_event() {
        let (uc, audit) = use_case(MockReasoning::returning(Ok(cancel_two())), NoContextProvider);
        let plan = uc
            .execute(ProposePlanRequest::new("q", "u1").with_correlation_id("corr-7"))
            .await
            .unwrap();
        let events = audit.events_for(plan.plan_id()).await.unwrap();
        assert_eq!(events[0].correlation_id.as_str(), "corr-7");
    }
}
