//! Context Provider Port (Driven Port)
//!
//! Read-only access to a snapshot of current system state.

use async_trait::async_trait;

use crate::domain::command_plan::ContextSnapshot;

/// Context provider error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The provider could not produce a snapshot.
    #[error("Context provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for the context provider.
#[async_trait]
pub trait ContextProviderPort: Send + Sync {
    /// Capture the current system state.
    async fn snapshot(&self) -> Result<ContextSnapshot, ContextError>;

    /// Whether the provider is able to serve snapshots.
    async fn health(&self) -> bool;
}

/// Context provider that never has context. Proposals proceed without one.
#[derive(Debug, Clone, Default)]
pub struct NoContextProvider;

#[async_trait]
impl ContextProviderPort for NoContextProvider {
    async fn snapshot(&self) -> Result<ContextSnapshot, ContextError> {
        Err(ContextError::Unavailable {
            message: "no context provider configured".to_string(),
        })
    }

    async fn health(&self) -> bool {
        false
    }
}
