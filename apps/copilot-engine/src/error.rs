//! Caller-facing error taxonomy for the plan workflow.
//!
//! Every workflow operation fails with a [`WorkflowError`]. Each variant maps to a
//! stable [`ErrorCode`] that the HTTP layer exposes to clients.
//!
//! # HTTP Status Codes
//!
//! | Code | Status | Usage |
//! |------|--------|-------|
//! | `INVALID_REQUEST` | 400 | Malformed caller input |
//! | `INVALID_COMMAND` | 422 | Proposed plan content failed validation |
//! | `PLAN_NOT_FOUND` | 404 | No proposal recorded for the plan |
//! | `PLAN_NOT_PENDING` | 409 | Plan unknown or already decided |
//! | `PLAN_NOT_APPROVED` | 409 | Execution requested for an unapproved plan |
//! | `EXECUTION_IN_PROGRESS` | 409 | Another caller is executing the plan |
//! | `REASONING_UNAVAILABLE` | 503 | Reasoning service failed |
//! | `REASONING_TIMEOUT` | 504 | Reasoning service timed out |
//! | `AUDIT_WRITE_FAILED` | 500 | Event could not be made durable |
//! | `AUDIT_READ_FAILED` | 500 | Event history could not be read |
//! | `RESULT_WRITE_FAILED` | 500 | Execution ran but its result could not be stored |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::command_plan::PlanError;

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed caller input.
    InvalidRequest,
    /// Reasoning service unavailable or returned garbage.
    ReasoningUnavailable,
    /// Reasoning service timed out.
    ReasoningTimeout,
    /// Proposed plan content failed validation.
    InvalidCommand,
    /// Audit event could not be persisted.
    AuditWriteFailed,
    /// Audit history could not be read.
    AuditReadFailed,
    /// No proposal exists for the plan.
    PlanNotFound,
    /// Plan cannot be decided now.
    PlanNotPending,
    /// Plan has not been approved.
    PlanNotApproved,
    /// Plan execution is running elsewhere.
    ExecutionInProgress,
    /// Execution result could not be stored.
    ResultWriteFailed,
}

impl ErrorCode {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::InvalidCommand => 422,
            Self::PlanNotFound => 404,
            Self::PlanNotPending | Self::PlanNotApproved | Self::ExecutionInProgress => 409,
            Self::ReasoningUnavailable => 503,
            Self::ReasoningTimeout => 504,
            Self::AuditWriteFailed | Self::AuditReadFailed | Self::ResultWriteFailed => 500,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::ReasoningUnavailable => "REASONING_UNAVAILABLE",
            Self::ReasoningTimeout => "REASONING_TIMEOUT",
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::AuditWriteFailed => "AUDIT_WRITE_FAILED",
            Self::AuditReadFailed => "AUDIT_READ_FAILED",
            Self::PlanNotFound => "PLAN_NOT_FOUND",
            Self::PlanNotPending => "PLAN_NOT_PENDING",
            Self::PlanNotApproved => "PLAN_NOT_APPROVED",
            Self::ExecutionInProgress => "EXECUTION_IN_PROGRESS",
            Self::ResultWriteFailed => "RESULT_WRITE_FAILED",
        }
    }

    /// Whether the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ReasoningUnavailable
                | Self::ReasoningTimeout
                | Self::AuditWriteFailed
                | Self::AuditReadFailed
                | Self::ExecutionInProgress
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Errors returned by workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Caller input failed validation.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// What was wrong.
        message: String,
    },

    /// The reasoning service failed.
    #[error("Reasoning unavailable: {message}")]
    ReasoningUnavailable {
        /// Underlying cause.
        message: String,
    },

    /// The reasoning service did not answer in time.
    #[error("Reasoning timed out after {timeout_ms}ms")]
    ReasoningTimeout {
        /// Configured budget.
        timeout_ms: u64,
    },

    /// A proposed command failed validation. Nothing was persisted.
    #[error("Invalid command at position {index:?}: {reason}")]
    InvalidCommand {
        /// Position of the offending command, if any.
        index: Option<usize>,
        /// Why it was rejected.
        reason: String,
    },

    /// An audit event could not be made durable. The operation had no effect.
    #[error("Audit write failed: {message}")]
    AuditWriteFailed {
        /// Underlying cause.
        message: String,
    },

    /// Audit history could not be read.
    #[error("Audit read failed: {message}")]
    AuditReadFailed {
        /// Underlying cause.
        message: String,
    },

    /// No proposal exists for the plan.
    #[error("Plan not found: {plan_id}")]
    PlanNotFound {
        /// Plan identifier.
        plan_id: String,
    },

    /// The plan is unknown or already decided.
    #[error("Plan {plan_id} is not pending")]
    PlanNotPending {
        /// Plan identifier.
        plan_id: String,
    },

    /// The plan has no recorded approval.
    #[error("Plan {plan_id} is not approved")]
    PlanNotApproved {
        /// Plan identifier.
        plan_id: String,
    },

    /// Another caller holds the execution claim and has not stored a result.
    #[error("Plan {plan_id} is already being executed")]
    ExecutionInProgress {
        /// Plan identifier.
        plan_id: String,
    },

    /// Commands ran but the result could not be stored. The plan will not run again.
    #[error("Execution result for plan {plan_id} could not be stored: {message}")]
    ResultWriteFailed {
        /// Plan identifier.
        plan_id: String,
        /// Underlying cause.
        message: String,
    },
}

impl WorkflowError {
    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::ReasoningUnavailable { .. } => ErrorCode::ReasoningUnavailable,
            Self::ReasoningTimeout { .. } => ErrorCode::ReasoningTimeout,
            Self::InvalidCommand { .. } => ErrorCode::InvalidCommand,
            Self::AuditWriteFailed { .. } => ErrorCode::AuditWriteFailed,
            Self::AuditReadFailed { .. } => ErrorCode::AuditReadFailed,
            Self::PlanNotFound { .. } => ErrorCode::PlanNotFound,
            Self::PlanNotPending { .. } => ErrorCode::PlanNotPending,
            Self::PlanNotApproved { .. } => ErrorCode::PlanNotApproved,
            Self::ExecutionInProgress { .. } => ErrorCode::ExecutionInProgress,
            Self::ResultWriteFailed { .. } => ErrorCode::ResultWriteFailed,
        }
    }

    /// Invalid request with a message.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

impl From<PlanError> for WorkflowError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::EmptyQuery => Self::invalid_request(err.to_string()),
            other => Self::InvalidCommand {
                index: other.index(),
                reason: other.to_string(),
            },
        }
    }
}
