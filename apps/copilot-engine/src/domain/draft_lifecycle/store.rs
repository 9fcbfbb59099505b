//! Audit Log Store Trait
//!
//! Persistence abstraction for draft events, implemented by infrastructure adapters.

use async_trait::async_trait;

use super::errors::AuditError;
use super::events::DraftEvent;
use super::value_objects::DraftStatus;
use crate::domain::shared::PlanId;

/// Append-only store of draft events, keyed by plan.
///
/// Appends are conditional: a proposal is accepted only for a plan with no history,
/// and a decision only for a plan whose history is exactly its proposal. Concurrent
/// decisions on one plan therefore resolve to a single winner; the others get
/// `AuditError::Conflict`. An append must be durable before it returns `Ok`, and a
/// read must observe every prior successful append for the same plan.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Append an event.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the event does not follow the current history,
    /// `WriteFailed` when it could not be made durable.
    async fn append(&self, event: &DraftEvent) -> Result<(), AuditError>;

    /// Events for a plan, in append order. Empty for an unknown plan.
    ///
    /// # Errors
    ///
    /// Returns `ReadFailed` if the history cannot be read.
    async fn events_for(&self, plan_id: &PlanId) -> Result<Vec<DraftEvent>, AuditError>;

    /// Derive a plan's status by replaying its events.
    ///
    /// # Errors
    ///
    /// Returns `ReadFailed` if the history cannot be read.
    async fn status(&self, plan_id: &PlanId) -> Result<Option<DraftStatus>, AuditError> {
        let events = self.events_for(plan_id).await?;
        Ok(DraftStatus::replay(&events))
    }
}

/// Check that `event` may be appended after `existing`.
///
/// # Errors
///
/// Returns `AuditError::Conflict` describing the violated precondition.
pub fn check_append(existing: &[DraftEvent], event: &DraftEvent) -> Result<(), AuditError> {
    let conflict = |reason: &str| AuditError::Conflict {
        plan_id: event.plan_id.to_string(),
        reason: reason.to_string(),
    };

    if event.is_decision() {
        return match DraftStatus::replay(existing) {
            Some(DraftStatus::Pending) if existing.len() == 1 => Ok(()),
            None => Err(conflict("plan has not been proposed")),
            Some(_) => Err(conflict("plan has already been decided")),
        };
    }

    if existing.is_empty() {
        Ok(())
    } else {
        Err(conflict("plan already has a proposal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command_plan::{CandidatePlan, CommandPlan};
    use crate::domain::shared::{CorrelationId, UserId};

    fn proposed() -> DraftEvent {
        let plan = CommandPlan::propose(CandidatePlan::new("q", UserId::new("u1"))).unwrap();
        DraftEvent::proposed(plan, CorrelationId::generate())
    }

    fn approve(plan: &DraftEvent) -> DraftEvent {
        DraftEvent::approved(plan.plan_id.clone(), UserId::new("u1"), CorrelationId::generate())
    }

    #[test]
    fn proposal_requires_empty_history() {
        let p = proposed();
        assert!(check_append(&[], &p).is_ok());
        assert!(matches!(
            check_append(std::slice::from_ref(&p), &p),
            Err(AuditError::Conflict { .. })
        ));
    }

    #[test]
    fn decision_requires_pending_plan() {
        let p = proposed();
        let a = approve(&p);
        assert!(check_append(&[], &a).is_err());
        assert!(check_append(std::slice::from_ref(&p), &a).is_ok());
        assert!(check_append(&[p.clone(), a.clone()], &approve(&p)).is_err());
    }
}
