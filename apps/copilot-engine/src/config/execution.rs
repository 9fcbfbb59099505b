//! Approval and execution tuning.

use serde::{Deserialize, Serialize};

use crate::application::use_cases::DispatchMode;

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// `sequential` or `concurrent`.
    #[serde(default)]
    pub dispatch: DispatchMode,
    /// Maximum concurrently running commands in concurrent mode.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Warn when a plan's context is older than this at execution time.
    #[serde(default = "default_stale_context_warn_secs")]
    pub stale_context_warn_secs: u64,
    /// Longest accepted rejection reason, in characters.
    #[serde(default = "default_max_reject_reason_len")]
    pub max_reject_reason_len: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::default(),
            max_in_flight: default_max_in_flight(),
            stale_context_warn_secs: default_stale_context_warn_secs(),
            max_reject_reason_len: default_max_reject_reason_len(),
        }
    }
}

const fn default_max_in_flight() -> usize {
    4
}

const fn default_stale_context_warn_secs() -> u64 {
    300
}

const fn default_max_reject_reason_len() -> usize {
    1000
}
