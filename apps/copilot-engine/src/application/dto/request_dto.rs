//! Request DTOs for workflow operations.

use serde::{Deserialize, Serialize};

use crate::domain::command_plan::ContextSnapshot;
use crate::domain::shared::{CorrelationId, UserId};

fn resolve_correlation(id: Option<&String>) -> CorrelationId {
    id.filter(|s| !s.trim().is_empty())
        .map_or_else(CorrelationId::generate, |s| CorrelationId::new(s.trim()))
}

/// Request to propose a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposePlanRequest {
    /// Natural-language request.
    pub query: String,
    /// Requesting principal.
    pub user_id: String,
    /// Context to reason over. The context provider is consulted when absent.
    #[serde(default)]
    pub context: Option<ContextSnapshot>,
    /// Correlation id; generated when absent.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl ProposePlanRequest {
    /// Create a request without context.
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            context: None,
            correlation_id: None,
        }
    }

    /// Attach a context snapshot.
    #[must_use]
    pub fn with_context(mut self, context: ContextSnapshot) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// The requesting principal.
    #[must_use]
    pub fn user(&self) -> UserId {
        UserId::new(self.user_id.trim())
    }

    /// The given correlation id, or a fresh one.
    #[must_use]
    pub fn correlation(&self) -> CorrelationId {
        resolve_correlation(self.correlation_id.as_ref())
    }
}

/// Request to approve or reject a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// Deciding principal.
    pub user_id: String,
    /// Rejection reason. Ignored for approvals.
    #[serde(default)]
    pub reason: Option<String>,
    /// Correlation id; generated when absent.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl DecisionRequest {
    /// Create a decision request.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            reason: None,
            correlation_id: None,
        }
    }

    /// Set the rejection reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// The deciding principal.
    #[must_use]
    pub fn user(&self) -> UserId {
        UserId::new(self.user_id.trim())
    }

    /// The given correlation id, or a fresh one.
    #[must_use]
    pub fn correlation(&self) -> CorrelationId {
        resolve_correlation(self.correlation_id.as_ref())
    }
}

/// Request to execute an approved plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePlanRequest {
    /// Executing principal.
    pub user_id: String,
    /// Correlation id; generated when absent.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl ExecutePlanRequest {
    /// Create an execution request.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            correlation_id: None,
        }
    }

    /// Set the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// The executing principal.
    #[must_use]
    pub fn user(&self) -> UserId {
        UserId::new(self.user_id.trim())
    }

    /// The given correlation id, or a fresh one.
    #[must_use]
    pub fn correlation(&self) -> CorrelationId {
        resolve_correlation(self.correlation_id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_is_kept_or_generated() {
        let given = ExecutePlanRequest::new("u1").with_correlation_id("c-1");
        assert_eq!(given.correlation().as_str(), "c-1");

        let blank = ExecutePlanRequest::new("u1").with_correlation_id("  ");
        assert!(!blank.correlation().as_str().trim().is_empty());

        let a = DecisionRequest::new("u1").correlation();
        let b = DecisionRequest::new("u1").correlation();
        assert_ne!(a, b);
    }

    #[test]
    fn propose_request_deserializes_camel_case() {
        let req: ProposePlanRequest =
            serde_json::from_str(r#"{"query":"cancel O-1","userId":"u1"}"#).unwrap();
        assert_eq!(req.user().as_str(), "u1");
        assert!(req.context.is_none());
    }
}
