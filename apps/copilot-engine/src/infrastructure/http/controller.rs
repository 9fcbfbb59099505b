//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to the plan workflow.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::application::dto::{DecisionResponseDto, ExecutionResultDto};
use crate::application::ports::{ContextProviderPort, ReasoningPort};
use crate::application::services::PlanWorkflow;
use crate::domain::draft_lifecycle::{AuditLogStore, DraftStatus};
use crate::domain::plan_execution::ExecutionLedger;
use crate::domain::shared::PlanId;
use crate::error::WorkflowError;

use super::request::{CreateDraftRequest, DecideDraftRequest, ExecuteDraftRequest};
use super::response::{CreateDraftResponse, ErrorResponse, HealthResponse};

const CORRELATION_HEADER: &str = "x-correlation-id";

/// Application state shared across handlers.
pub struct AppState<R, C, A, L>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    /// The plan workflow.
    pub workflow: Arc<PlanWorkflow<R, C, A, L>>,
    /// Application version.
    pub version: String,
}

impl<R, C, A, L> Clone for AppState<R, C, A, L>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    fn clone(&self) -> Self {
        Self {
            workflow: Arc::clone(&self.workflow),
            version: self.version.clone(),
        }
    }
}

/// A workflow error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(WorkflowError);

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            code: code.reason().to_string(),
            message: self.0.to_string(),
            retryable: code.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<R, C, A, L>(state: AppState<R, C, A, L>) -> Router
where
    R: ReasoningPort + 'static,
    C: ContextProviderPort + 'static,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/copilot/drafts", post(create_draft))
        .route("/api/v1/copilot/drafts/{plan_id}", get(get_draft))
        .route("/api/v1/copilot/drafts/{plan_id}/events", get(get_events))
        .route("/api/v1/copilot/drafts/{plan_id}/approve", post(approve_draft))
        .route("/api/v1/copilot/drafts/{plan_id}/reject", post(reject_draft))
        .route("/api/v1/copilot/drafts/{plan_id}/execute", post(execute_draft))
        .with_state(state)
}

fn correlation_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Health check endpoint.
async fn health_check<R, C, A, L>(State(state): State<AppState<R, C, A, L>>) -> impl IntoResponse
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Propose a plan.
async fn create_draft<R, C, A, L>(
    State(state): State<AppState<R, C, A, L>>,
    headers: HeaderMap,
    Json(request): Json<CreateDraftRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    let dto = request.into_dto(correlation_header(&headers));
    let plan = state.workflow.propose(dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDraftResponse {
            plan_id: plan.plan_id().to_string(),
            status: DraftStatus::Pending,
            plan,
        }),
    ))
}

/// A plan with its status and execution result.
async fn get_draft<R, C, A, L>(
    State(state): State<AppState<R, C, A, L>>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    let view = state.workflow.plan(&PlanId::new(plan_id)).await?;
    Ok(Json(view))
}

/// Full event history of a plan.
async fn get_events<R, C, A, L>(
    State(state): State<AppState<R, C, A, L>>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    let trail = state.workflow.audit_trail(&PlanId::new(plan_id)).await?;
    Ok(Json(trail))
}

async fn approve_draft<R, C, A, L>(
    State(state): State<AppState<R, C, A, L>>,
    Path(plan_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DecideDraftRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    let plan_id = PlanId::new(plan_id);
    let status = state
        .workflow
        .approve(&plan_id, request.into_dto(correlation_header(&headers)))
        .await?;

    Ok(Json(DecisionResponseDto {
        plan_id: plan_id.into_inner(),
        status,
    }))
}

async fn reject_draft<R, C, A, L>(
    State(state): State<AppState<R, C, A, L>>,
    Path(plan_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DecideDraftRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    let plan_id = PlanId::new(plan_id);
    let status = state
        .workflow
        .reject(&plan_id, request.into_dto(correlation_header(&headers)))
        .await?;

    Ok(Json(DecisionResponseDto {
        plan_id: plan_id.into_inner(),
        status,
    }))
}

/// Execute an approved plan. Repeated calls return the stored result.
async fn execute_draft<R, C, A, L>(
    State(state): State<AppState<R, C, A, L>>,
    Path(plan_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ExecuteDraftRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ReasoningPort,
    C: ContextProviderPort,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    let result = state
        .workflow
        .execute(
            &PlanId::new(plan_id),
            request.into_dto(correlation_header(&headers)),
        )
        .await?;

    Ok(Json(ExecutionResultDto::from_result(&result)))
}
