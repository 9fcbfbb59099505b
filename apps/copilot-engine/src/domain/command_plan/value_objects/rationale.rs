//! Explanation attached to a proposed plan.

use serde::{Deserialize, Serialize};

/// Why the reasoning engine proposed a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rationale {
    /// Short summary of what the plan does.
    #[serde(default)]
    pub summary: String,
    /// Detailed reasoning for the approach.
    #[serde(default)]
    pub reasoning: String,
    /// Alternative approaches considered.
    #[serde(default)]
    pub alternatives: Vec<String>,
}
