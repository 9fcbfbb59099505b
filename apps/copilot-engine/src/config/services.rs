//! Collaborating services: the reasoning agent, the context provider and the
//! downstream domain services that perform commands.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::command_plan::CommandDomain;

/// Reasoning agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Agent base URL.
    #[serde(default = "default_agent_url")]
    pub base_url: String,
    /// Path of the propose endpoint.
    #[serde(default = "default_propose_path")]
    pub propose_path: String,
    /// Budget for one reasoning call in milliseconds.
    #[serde(default = "default_reasoning_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: default_agent_url(),
            propose_path: default_propose_path(),
            timeout_ms: default_reasoning_timeout_ms(),
        }
    }
}

impl ReasoningConfig {
    /// Reasoning timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Context provider configuration. Without a base URL no context is consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Provider base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Path of the snapshot endpoint.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Path of the health endpoint.
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_context_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            snapshot_path: default_snapshot_path(),
            health_path: default_health_path(),
            timeout_ms: default_context_timeout_ms(),
        }
    }
}

impl ContextConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Downstream domain services. A domain without a base URL has no executor,
/// and its commands fail as unsupported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorsConfig {
    /// Order management service.
    #[serde(default)]
    pub oms: Option<String>,
    /// Execution management service.
    #[serde(default)]
    pub ems: Option<String>,
    /// Portfolio management service.
    #[serde(default)]
    pub pms: Option<String>,
    /// Compliance service.
    #[serde(default)]
    pub compliance: Option<String>,
    /// Budget for a single command in milliseconds.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for ExecutorsConfig {
    fn default() -> Self {
        Self {
            oms: None,
            ems: None,
            pms: None,
            compliance: None,
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl ExecutorsConfig {
    /// Base URL configured for a domain.
    #[must_use]
    pub fn base_url(&self, domain: CommandDomain) -> Option<&str> {
        match domain {
            CommandDomain::Orders => self.oms.as_deref(),
            CommandDomain::Executions => self.ems.as_deref(),
            CommandDomain::Portfolios => self.pms.as_deref(),
            CommandDomain::Compliance => self.compliance.as_deref(),
        }
        .filter(|url| !url.is_empty())
    }

    /// Per-command timeout as a `Duration`.
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

fn default_agent_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_propose_path() -> String {
    "/copilot/propose".to_string()
}

fn default_snapshot_path() -> String {
    "/copilot/context".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

const fn default_reasoning_timeout_ms() -> u64 {
    30_000
}

const fn default_context_timeout_ms() -> u64 {
    2_000
}

const fn default_command_timeout_ms() -> u64 {
    10_000
}
