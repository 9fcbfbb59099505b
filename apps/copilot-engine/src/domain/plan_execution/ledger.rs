//! Execution Ledger Trait
//!
//! Exclusive per-plan execution claims and the single stored result per plan.

use async_trait::async_trait;

use super::aggregate::ExecutionResult;
use super::errors::LedgerError;
use crate::domain::shared::PlanId;

/// Outcome of trying to claim a plan for execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// The caller won the claim and must run the plan, then `record` the result.
    Acquired,
    /// The plan already ran; this is its stored result.
    Completed(Box<ExecutionResult>),
    /// Another caller holds the claim and has not recorded a result yet.
    InProgress,
}

/// Durable execution markers keyed by plan.
///
/// `try_claim` is a conditional write: across all callers, and across restarts for
/// durable implementations, exactly one receives `Claim::Acquired` for a plan. A claim
/// that never gets a recorded result stays held; the plan is not run again.
#[async_trait]
pub trait ExecutionLedger: Send + Sync {
    /// Try to claim a plan for execution.
    ///
    /// # Errors
    ///
    /// Returns error if the claim cannot be written or the existing state read.
    async fn try_claim(&self, plan_id: &PlanId) -> Result<Claim, LedgerError>;

    /// Store the result for a claimed plan. Written once.
    ///
    /// # Errors
    ///
    /// Returns `WriteFailed` if the result could not be made durable.
    async fn record(&self, result: &ExecutionResult) -> Result<(), LedgerError>;

    /// Stored result for a plan, if any.
    ///
    /// # Errors
    ///
    /// Returns `ReadFailed` if the result cannot be read.
    async fn find(&self, plan_id: &PlanId) -> Result<Option<ExecutionResult>, LedgerError>;
}
