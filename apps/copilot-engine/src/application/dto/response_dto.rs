//! Response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::command_plan::CommandPlan;
use crate::domain::draft_lifecycle::{DraftEvent, DraftStatus};
use crate::domain::plan_execution::{CommandReport, ExecutionResult, ExecutionStatus};
use crate::domain::shared::Timestamp;

/// An execution result with its derived status made explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResultDto {
    /// Plan identifier.
    pub plan_id: String,
    /// Derived overall status.
    pub status: ExecutionStatus,
    /// Principal who executed.
    pub executed_by: String,
    /// Correlation id of the executing request.
    pub correlation_id: String,
    /// Start time.
    pub started_at: Timestamp,
    /// Completion time.
    pub completed_at: Timestamp,
    /// Duration in milliseconds.
    pub duration_ms: i64,
    /// Per-command outcomes in declared order.
    pub outcomes: Vec<CommandReport>,
}

impl ExecutionResultDto {
    /// Convert from the domain result.
    #[must_use]
    pub fn from_result(result: &ExecutionResult) -> Self {
        Self {
            plan_id: result.plan_id().to_string(),
            status: result.status(),
            executed_by: result.executed_by().to_string(),
            correlation_id: result.correlation_id().to_string(),
            started_at: result.started_at(),
            completed_at: result.completed_at(),
            duration_ms: result.duration_ms(),
            outcomes: result.reports().to_vec(),
        }
    }
}

/// Outcome of an approve or reject call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponseDto {
    /// Plan identifier.
    pub plan_id: String,
    /// Status after the decision.
    pub status: DraftStatus,
}

/// Derived state of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatusDto {
    /// Plan identifier.
    pub plan_id: String,
    /// Lifecycle status.
    pub status: DraftStatus,
    /// Execution status, once executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_status: Option<ExecutionStatus>,
}

/// A plan together with its derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    /// The plan as proposed.
    pub plan: CommandPlan,
    /// Lifecycle status.
    pub status: DraftStatus,
    /// Execution result, once executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResultDto>,
}

/// Full history of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrailDto {
    /// Plan identifier.
    pub plan_id: String,
    /// Lifecycle status derived from `events`.
    pub status: DraftStatus,
    /// Events in append order.
    pub events: Vec<DraftEvent>,
    /// Execution result, once executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResultDto>,
}
