//! Per-command outcomes.

use serde::{Deserialize, Serialize};

use super::FailureKind;
use crate::domain::command_plan::CommandKind;

/// What happened to one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CommandOutcome {
    /// The command ran and the downstream service accepted it.
    Success {
        /// Opaque downstream response.
        #[serde(default)]
        result: serde_json::Value,
    },
    /// The command ran and failed.
    Failure {
        /// Failure classification.
        kind: FailureKind,
        /// Human-readable detail.
        message: String,
    },
    /// The command was not attempted because its dependency did not succeed.
    Skipped {
        /// Position of the dependency that blocked it.
        #[serde(rename = "blockedBy")]
        blocked_by: usize,
    },
}

impl CommandOutcome {
    /// Failure outcome.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Whether the command succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Outcome of the command at a given plan position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandReport {
    /// Position in the plan.
    pub index: usize,
    /// Command kind.
    pub command: CommandKind,
    /// What happened.
    #[serde(flatten)]
    pub outcome: CommandOutcome,
}
