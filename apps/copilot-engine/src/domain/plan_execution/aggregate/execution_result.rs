//! ExecutionResult Aggregate Root
//!
//! Created once per plan, on the only permitted execution attempt.

use serde::{Deserialize, Serialize};

use crate::domain::plan_execution::value_objects::{CommandReport, ExecutionStatus};
use crate::domain::shared::{CorrelationId, PlanId, Timestamp, UserId};

/// The stored record of a plan's execution.
///
/// Reports are ordered by declared command position regardless of the order
/// commands actually finished in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    plan_id: PlanId,
    executed_by: UserId,
    correlation_id: CorrelationId,
    started_at: Timestamp,
    completed_at: Timestamp,
    reports: Vec<CommandReport>,
}

impl ExecutionResult {
    /// Assemble a result. Reports are sorted by position.
    #[must_use]
    pub fn new(
        plan_id: PlanId,
        executed_by: UserId,
        correlation_id: CorrelationId,
        started_at: Timestamp,
        mut reports: Vec<CommandReport>,
    ) -> Self {
        reports.sort_by_key(|r| r.index);
        Self {
            plan_id,
            executed_by,
            correlation_id,
            started_at,
            completed_at: Timestamp::now(),
            reports,
        }
    }

    /// Plan identifier.
    #[must_use]
    pub const fn plan_id(&self) -> &PlanId {
        &self.plan_id
    }

    /// Principal who triggered execution.
    #[must_use]
    pub const fn executed_by(&self) -> &UserId {
        &self.executed_by
    }

    /// Correlation id of the executing request.
    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// When execution started.
    #[must_use]
    pub const fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// When execution finished.
    #[must_use]
    pub const fn completed_at(&self) -> Timestamp {
        self.completed_at
    }

    /// Per-command reports in declared order.
    #[must_use]
    pub fn reports(&self) -> &[CommandReport] {
        &self.reports
    }

    /// Overall status, derived from the outcomes.
    #[must_use]
    pub fn status(&self) -> ExecutionStatus {
        ExecutionStatus::derive(self.reports.iter().map(|r| &r.outcome))
    }

    /// Wall-clock duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.completed_at
            .duration_since(self.started_at)
            .num_milliseconds()
    }
}
