//! Draft status, derived from the event history.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::draft_lifecycle::events::{DraftEvent, DraftEventPayload};

/// Lifecycle status of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    /// Proposed, awaiting a decision.
    Pending,
    /// Approved for execution. Terminal.
    Approved,
    /// Rejected. Terminal.
    Rejected,
}

impl DraftStatus {
    /// Fold an ordered event history into a status.
    ///
    /// Returns `None` when the history has no proposal. Once a decision is seen,
    /// later events do not change the outcome.
    #[must_use]
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a DraftEvent>) -> Option<Self> {
        events
            .into_iter()
            .fold(None, |status, event| match (status, &event.payload) {
                (None, DraftEventPayload::Proposed { .. }) => Some(Self::Pending),
                (Some(Self::Pending), DraftEventPayload::Approved) => Some(Self::Approved),
                (Some(Self::Pending), DraftEventPayload::Rejected { .. }) => Some(Self::Rejected),
                (current, _) => current,
            })
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
