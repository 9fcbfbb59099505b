// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Copilot Engine - Command Plan Orchestration Core
//!
//! Turns natural-language requests into reviewable command plans and applies
//! them only after a recorded human approval.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core workflow rules
//!   - `command_plan`: Commands, the command catalogue, the immutable plan
//!   - `draft_lifecycle`: Draft events, status replay, the audit log contract
//!   - `plan_execution`: Per-command outcomes, execution results, the ledger contract
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Reasoning, context and command executor interfaces
//!   - `use_cases`: `ProposePlan`, `DecidePlan`, `ExecutePlan`, `QueryPlan`
//!   - `services`: `PlanWorkflow`, the caller-facing API
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: Audit log and ledger (in-memory, files)
//!   - `reasoning`, `context`, `executors`: HTTP clients for collaborators
//!   - `http`: REST API
//!   - `config`: Dependency injection container
//!
//! # Guarantees
//!
//! - No command runs without an `AI_DRAFT_APPROVED` event for its plan.
//! - At most one of approve/reject is recorded per plan.
//! - An approved plan's commands run at most once; later calls get the stored result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Workflow error taxonomy.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::command_plan::{Command, CommandKind, CommandPlan, ParamValue};
pub use domain::draft_lifecycle::{AuditLogStore, DraftEvent, DraftStatus};
pub use domain::plan_execution::{
    CommandOutcome, ExecutionLedger, ExecutionResult, ExecutionStatus, FailureKind,
};
pub use domain::shared::{CorrelationId, PlanId, Timestamp, UserId};

// Application re-exports
pub use application::dto::{DecisionRequest, ExecutePlanRequest, ProposePlanRequest};
pub use application::ports::{
    CommandExecutorPort, ContextProviderPort, ExecutorRegistry, ReasoningPort,
};
pub use application::services::{PlanWorkflow, WorkflowSettings};
pub use error::{ErrorCode, WorkflowError};

// Infrastructure re-exports
pub use infrastructure::config::Container;
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::{
    FileAuditLog, FileExecutionLedger, InMemoryAuditLog, InMemoryExecutionLedger,
};
