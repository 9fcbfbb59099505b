//! Reasoning Port (Driven Port)
//!
//! Interface to the service that turns a natural-language request into proposed commands.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::command_plan::{ContextSnapshot, ProposedCommand, Rationale};
use crate::domain::shared::UserId;

/// Input to the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningRequest {
    /// The natural-language request.
    pub query: String,
    /// Requesting principal.
    pub user_id: UserId,
    /// Context to reason over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextSnapshot>,
}

/// Proposed commands plus metadata, as returned by the reasoning service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningOutput {
    /// Proposed commands in order.
    #[serde(default)]
    pub commands: Vec<ProposedCommand>,
    /// Explanation.
    #[serde(default)]
    pub rationale: Rationale,
    /// Assumptions made.
    #[serde(default)]
    pub assumptions: Vec<String>,
    /// Events expected on execution.
    #[serde(default)]
    pub expected_events: Vec<String>,
    /// Confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Route to navigate to afterwards.
    #[serde(default)]
    pub route: Option<String>,
    /// Route query parameters.
    #[serde(default)]
    pub query_params: Option<BTreeMap<String, String>>,
}

/// Reasoning port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReasoningError {
    /// The service failed or returned an unusable response.
    #[error("Reasoning service unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// The service did not answer in time.
    #[error("Reasoning service timed out after {timeout_ms}ms")]
    Timeout {
        /// Time budget that elapsed.
        timeout_ms: u64,
    },
}

/// Port for the reasoning service. Implementations must not retry.
#[async_trait]
pub trait ReasoningPort: Send + Sync {
    /// Propose commands for a request.
    async fn reason(&self, request: &ReasoningRequest) -> Result<ReasoningOutput, ReasoningError>;
}
