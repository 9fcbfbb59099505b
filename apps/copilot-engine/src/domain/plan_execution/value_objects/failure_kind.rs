//! Classification of a single command's failure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a command failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// No executor is registered for the command kind.
    UnsupportedCommand,
    /// The downstream service throttled the request.
    RateLimited,
    /// The downstream service refused the command (business rule or validation).
    Rejected,
    /// The target entity does not exist.
    NotFound,
    /// The downstream service could not be reached or failed internally.
    Unavailable,
    /// The command did not finish within its time budget.
    Timeout,
    /// The command's parameters could not be turned into a request.
    InvalidParameters,
    /// Unexpected failure inside the executor.
    Internal,
}

impl FailureKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedCommand => "UNSUPPORTED_COMMAND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Rejected => "REJECTED",
            Self::NotFound => "NOT_FOUND",
            Self::Unavailable => "UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::InvalidParameters => "INVALID_PARAMETERS",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
