//! Snapshot of system state consulted while proposing a plan.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{SnapshotId, Timestamp};

/// Read-only system context captured at a point in time.
///
/// The payload is opaque to the orchestration core; it is forwarded to the reasoning
/// engine and kept on the plan for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    /// Snapshot identifier.
    pub snapshot_id: SnapshotId,
    /// When the snapshot was captured.
    pub captured_at: Timestamp,
    /// Opaque state payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ContextSnapshot {
    /// Capture a snapshot of `data` now.
    #[must_use]
    pub fn capture(data: serde_json::Value) -> Self {
        Self {
            snapshot_id: SnapshotId::generate(),
            captured_at: Timestamp::now(),
            data,
        }
    }

    /// Age of the snapshot at `at`, in whole seconds (never negative).
    #[must_use]
    pub fn age_secs_at(&self, at: Timestamp) -> u64 {
        u64::try_from(at.duration_since(self.captured_at).num_seconds()).unwrap_or(0)
    }
}
