//! In-memory stores for testing and development.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::draft_lifecycle::{AuditError, AuditLogStore, DraftEvent, check_append};
use crate::domain::plan_execution::{Claim, ExecutionLedger, ExecutionResult, LedgerError};
use crate::domain::shared::PlanId;

/// In-memory implementation of `AuditLogStore`.
///
/// Suitable for testing and development. Not durable.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    events: RwLock<HashMap<PlanId, Vec<DraftEvent>>>,
}

impl InMemoryAuditLog {
    /// Create a new empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of plans with at least one event.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no plan has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditLog {
    async fn append(&self, event: &DraftEvent) -> Result<(), AuditError> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        let history = events.entry(event.plan_id.clone()).or_default();
        check_append(history, event)?;
        history.push(event.clone());
        Ok(())
    }

    async fn events_for(&self, plan_id: &PlanId) -> Result<Vec<DraftEvent>, AuditError> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);
        Ok(events.get(plan_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
enum LedgerEntry {
    Claimed,
    Recorded(Box<ExecutionResult>),
}

/// In-memory implementation of `ExecutionLedger`.
#[derive(Debug, Default)]
pub struct InMemoryExecutionLedger {
    entries: RwLock<HashMap<PlanId, LedgerEntry>>,
}

impl InMemoryExecutionLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionLedger for InMemoryExecutionLedger {
    async fn try_claim(&self, plan_id: &PlanId) -> Result<Claim, LedgerError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(match entries.get(plan_id) {
            Some(LedgerEntry::Recorded(result)) => Claim::Completed(result.clone()),
            Some(LedgerEntry::Claimed) => Claim::InProgress,
            None => {
                entries.insert(plan_id.clone(), LedgerEntry::Claimed);
                Claim::Acquired
            }
        })
    }

    async fn record(&self, result: &ExecutionResult) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(entries.get(result.plan_id()), Some(LedgerEntry::Recorded(_))) {
            return Err(LedgerError::write(format!(
                "result for plan {} already recorded",
                result.plan_id()
            )));
        }
        entries.insert(
            result.plan_id().clone(),
            LedgerEntry::Recorded(Box::new(result.clone())),
        );
        Ok(())
    }

    async fn find(&self, plan_id: &PlanId) -> Result<Option<ExecutionResult>, LedgerError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(match entries.get(plan_id) {
            Some(LedgerEntry::Recorded(result)) => Some((**result).clone()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command_plan::{CandidatePlan, CommandPlan};
    use crate::domain::draft_lifecycle::DraftStatus;
    use crate::domain::shared::{CorrelationId, Timestamp, UserId};
    use std::sync::Arc;

    fn proposal() -> DraftEvent {
        let plan = CommandPlan::propose(CandidatePlan::new("q", UserId::new("u1"))).unwrap();
        DraftEvent::proposed(plan, CorrelationId::generate())
    }

    #[tokio::test]
    async fn audit_log_appends_in_order() {
        let log = InMemoryAuditLog::new();
        let p = proposal();
        log.append(&p).await.unwrap();
        log.append(&DraftEvent::approved(p.plan_id.clone(), UserId::new("u1"), CorrelationId::generate()))
            .await
            .unwrap();

        let events = log.events_for(&p.plan_id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], p);
        assert_eq!(log.status(&p.plan_id).await.unwrap(), Some(DraftStatus::Approved));
    }

    #[tokio::test]
    async fn unknown_plan_has_no_events() {
        let log = InMemoryAuditLog::new();
        assert!(log.events_for(&PlanId::new("x")).await.unwrap().is_empty());
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn concurrent_decisions_have_one_winner() {
        let log = Arc::new(InMemoryAuditLog::new());
        let p = proposal();
        log.append(&p).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let log = Arc::clone(&log);
            let id = p.plan_id.clone();
            handles.push(tokio::spawn(async move {
                let user = UserId::new(format!("u{i}"));
                let event = if i % 2 == 0 {
                    DraftEvent::approved(id, user, CorrelationId::generate())
                } else {
                    DraftEvent::rejected(id, user, None, CorrelationId::generate())
                };
                log.append(&event).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(log.events_for(&p.plan_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ledger_claims_once_and_replays_result() {
        let ledger = InMemoryExecutionLedger::new();
        let id = PlanId::new("p-1");

        assert_eq!(ledger.try_claim(&id).await.unwrap(), Claim::Acquired);
        assert_eq!(ledger.try_claim(&id).await.unwrap(), Claim::InProgress);
        assert!(ledger.find(&id).await.unwrap().is_none());

        let result = ExecutionResult::new(
            id.clone(),
            UserId::new("u1"),
            CorrelationId::new("c"),
            Timestamp::now(),
            Vec::new(),
        );
        ledger.record(&result).await.unwrap();

        assert_eq!(
            ledger.try_claim(&id).await.unwrap(),
            Claim::Completed(Box::new(result.clone()))
        );
        assert_eq!(ledger.find(&id).await.unwrap(), Some(result.clone()));
        assert!(ledger.record(&result).await.is_err());
    }
}
