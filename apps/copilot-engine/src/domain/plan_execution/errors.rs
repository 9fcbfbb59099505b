//! Execution Ledger Errors

use thiserror::Error;

/// Errors from an execution ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A claim or result could not be made durable.
    #[error("Ledger write failed: {message}")]
    WriteFailed {
        /// Underlying cause.
        message: String,
    },

    /// A claim or result could not be read.
    #[error("Ledger read failed: {message}")]
    ReadFailed {
        /// Underlying cause.
        message: String,
    },
}

impl LedgerError {
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
