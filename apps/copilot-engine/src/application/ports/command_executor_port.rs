//! Command Executor Port (Driven Port)
//!
//! Interface for the downstream handler that performs one command's mutation.

use async_trait::async_trait;

use crate::domain::command_plan::Command;
use crate::domain::plan_execution::FailureKind;
use crate::domain::shared::{CorrelationId, PlanId, UserId};

/// Who is running a command, and as part of what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Plan the command belongs to.
    pub plan_id: PlanId,
    /// Principal executing the plan.
    pub user_id: UserId,
    /// Correlation id to forward downstream.
    pub correlation_id: CorrelationId,
    /// Position of the command in the plan.
    pub index: usize,
}

/// A command that ran and failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CommandFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Error details.
    pub message: String,
}

impl CommandFailure {
    /// Create a failure.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Port for executing a single command. Implementations must not retry.
#[async_trait]
pub trait CommandExecutorPort: Send + Sync {
    /// Run the command and return the downstream response payload.
    async fn run(
        &self,
        command: &Command,
        context: &CommandContext,
    ) -> Result<serde_json::Value, CommandFailure>;
}
