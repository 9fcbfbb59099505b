//! HTTP request bodies.

use serde::{Deserialize, Serialize};

use crate::application::dto::{DecisionRequest, ExecutePlanRequest, ProposePlanRequest};
use crate::domain::command_plan::ContextSnapshot;

/// Body of `POST /api/v1/copilot/drafts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    /// Natural-language request.
    pub query: String,
    /// Requesting user.
    pub user_id: String,
    /// Caller-supplied context (current route, selections, ...). Captured as a
    /// snapshot on arrival.
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    /// Correlation id; the `X-Correlation-ID` header takes precedence.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl CreateDraftRequest {
    /// Convert to the workflow request.
    pub fn into_dto(self, correlation: Option<String>) -> ProposePlanRequest {
        ProposePlanRequest {
            query: self.query,
            user_id: self.user_id,
            context: self
                .context
                .filter(|c| !c.is_null())
                .map(ContextSnapshot::capture),
            correlation_id: correlation.or(self.correlation_id),
        }
    }
}

/// Body of the approve and reject endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideDraftRequest {
    /// Deciding user.
    pub user_id: String,
    /// Rejection reason. Ignored on approval.
    #[serde(default)]
    pub reason: Option<String>,
    /// Correlation id.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl DecideDraftRequest {
    /// Convert to the workflow request.
    pub fn into_dto(self, correlation: Option<String>) -> DecisionRequest {
        DecisionRequest {
            user_id: self.user_id,
            reason: self.reason,
            correlation_id: correlation.or(self.correlation_id),
        }
    }
}

/// Body of `POST /api/v1/copilot/drafts/{planId}/execute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteDraftRequest {
    /// Executing user.
    pub user_id: String,
    /// Correlation id.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl ExecuteDraftRequest {
    /// Convert to the workflow request.
    pub fn into_dto(self, correlation: Option<String>) -> ExecutePlanRequest {
        ExecutePlanRequest {
            user_id: self.user_id,
            correlation_id: correlation.or(self.correlation_id),
        }
    }
}
