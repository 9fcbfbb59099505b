//! HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::domain::command_plan::CommandPlan;
use crate::domain::draft_lifecycle::DraftStatus;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Error body for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code, e.g. `PLAN_NOT_PENDING`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Whether retrying the same request may succeed.
    pub retryable: bool,
}

/// Response to a created draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftResponse {
    /// Plan identifier.
    pub plan_id: String,
    /// Always `pending` for a new draft.
    pub status: DraftStatus,
    /// The proposed plan.
    pub plan: CommandPlan,
}
