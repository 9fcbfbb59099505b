//! Audit Log Errors

use thiserror::Error;

/// Errors from an audit log store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// The event could not be made durable.
    #[error("Audit write failed: {message}")]
    WriteFailed {
        /// Underlying cause.
        message: String,
    },

    /// The event history could not be read.
    #[error("Audit read failed: {message}")]
    ReadFailed {
        /// Underlying cause.
        message: String,
    },

    /// The event does not follow the plan's current history.
    #[error("Audit conflict for plan {plan_id}: {reason}")]
    Conflict {
        /// Plan identifier.
        plan_id: String,
        /// Why the append was refused.
        reason: String,
    },
}

impl AuditError {
    /// Build a write failure from any displayable cause.
    pub fn write(err: impl std::fmt::Display) -> Self {
        Self::WriteFailed {
            message: err.to_string(),
        }
    }

    /// Build a read failure from any displayable cause.
    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::ReadFailed {
            message: err.to_string(),
        }
    }
}
