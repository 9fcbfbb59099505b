//! Scripted reasoning client for testing.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::application::ports::{ReasoningError, ReasoningOutput, ReasoningPort, ReasoningRequest};

/// Replays queued responses in order, then falls back to a default.
///
/// Requests are recorded so tests can assert on what the proposer sent.
#[derive(Debug)]
pub struct ScriptedReasoningClient {
    responses: Mutex<VecDeque<Result<ReasoningOutput, ReasoningError>>>,
    fallback: ReasoningOutput,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl Default for ScriptedReasoningClient {
    fn default() -> Self {
        Self::new(ReasoningOutput::default())
    }
}

impl ScriptedReasoningClient {
    /// Create a client that answers every request with `fallback`.
    #[must_use]
    pub fn new(fallback: ReasoningOutput) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response for the next unanswered request.
    pub fn push(&self, response: Result<ReasoningOutput, ReasoningError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReasoningPort for ScriptedReasoningClient {
    async fn reason(&self, request: &ReasoningRequest) -> Result<ReasoningOutput, ReasoningError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
