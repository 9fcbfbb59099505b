//! Endpoint table for command kinds.

use reqwest::Method;

use crate::domain::command_plan::CommandKind;

/// Where and how a command kind is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Path template. `{name}` segments are filled from command parameters.
    pub path: &'static str,
    /// Body field naming the acting user.
    pub actor_field: &'static str,
}

impl Route {
    fn new(method: Method, path: &'static str, actor_field: &'static str) -> Self {
        Self {
            method,
            path,
            actor_field,
        }
    }

    /// Parameter names used as path segments.
    pub fn path_params(&self) -> impl Iterator<Item = &'static str> {
        self.path
            .split('/')
            .filter_map(|s| s.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
    }
}

/// Route for a command kind.
#[must_use]
pub fn route_for(kind: CommandKind) -> Route {
    match kind {
        CommandKind::CreateOrder => Route::new(Method::POST, "/api/oms/orders", "createdBy"),
        CommandKind::AmendOrder => {
            Route::new(Method::PATCH, "/api/oms/orders/{orderId}/amend", "updatedBy")
        }
        CommandKind::ApproveOrder => {
            Route::new(Method::POST, "/api/oms/orders/{orderId}/approve", "approvedBy")
        }
        CommandKind::CancelOrder => {
            Route::new(Method::POST, "/api/oms/orders/{orderId}/cancel", "cancelledBy")
        }
        CommandKind::SendToEms => {
            Route::new(Method::POST, "/api/oms/orders/{orderId}/send-to-ems", "sentBy")
        }
        CommandKind::RequestExecution => {
            Route::new(Method::POST, "/api/ems/executions/request", "requestedBy")
        }
        CommandKind::ApproveProposal => Route::new(
            Method::POST,
            "/api/pms/proposals/{proposalId}/approve",
            "approvedBy",
        ),
        CommandKind::SendProposalToOms => Route::new(
            Method::POST,
            "/api/pms/proposals/{proposalId}/send-to-oms",
            "sentBy",
        ),
        CommandKind::EnableRule => Route::new(
            Method::POST,
            "/api/compliance/rules/{ruleId}/enable",
            "updatedBy",
        ),
        CommandKind::DisableRule => Route::new(
            Method::POST,
            "/api/compliance/rules/{ruleId}/disable",
            "updatedBy",
        ),
        CommandKind::DeleteRule => {
            Route::new(Method::DELETE, "/api/compliance/rules/{ruleId}", "deletedBy")
        }
        CommandKind::PublishRuleSet => Route::new(
            Method::POST,
            "/api/compliance/rule-sets/{ruleSetId}/publish",
            "publishedBy",
        ),
    }
}
