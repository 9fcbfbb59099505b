//! Configuration module for the copilot engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before any component is built.
//!
//! # Usage
//!
//! ```rust,ignore
//! use copilot_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod execution;
mod observability;
mod persistence;
mod server;
mod services;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use execution::ExecutionConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use persistence::{PersistenceBackend, PersistenceConfig};
pub use server::ServerConfig;
pub use services::{ContextConfig, ExecutorsConfig, ReasoningConfig};

use crate::application::services::WorkflowSettings;
use crate::application::use_cases::ExecutionSettings;
use crate::domain::command_plan::CommandDomain;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Reasoning agent.
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    /// Context provider.
    #[serde(default)]
    pub context: ContextConfig,
    /// Downstream domain services.
    #[serde(default)]
    pub executors: ExecutorsConfig,
    /// Approval and execution tuning.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Audit log and ledger storage.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Workflow settings derived from this configuration.
    #[must_use]
    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            reasoning_timeout: self.reasoning.timeout(),
            max_reject_reason_len: self.execution.max_reject_reason_len,
            execution: ExecutionSettings {
                dispatch: self.execution.dispatch,
                max_in_flight: self.execution.max_in_flight,
                command_timeout: self.executors.command_timeout(),
                stale_context_warn: Duration::from_secs(self.execution.stale_context_warn_secs),
            },
        }
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{field} must be an http(s) URL, got '{url}'"
        )))
    }
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be non-zero".to_string(),
        ));
    }

    validate_url("reasoning.base_url", &config.reasoning.base_url)?;
    if let Some(url) = &config.context.base_url {
        validate_url("context.base_url", url)?;
    }
    for domain in CommandDomain::ALL {
        if let Some(url) = config.executors.base_url(domain) {
            validate_url(&format!("executors.{}", domain.service_key()), url)?;
        }
    }

    let timeouts = [
        ("reasoning.timeout_ms", config.reasoning.timeout_ms),
        ("context.timeout_ms", config.context.timeout_ms),
        ("executors.command_timeout_ms", config.executors.command_timeout_ms),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be positive"
            )));
        }
    }

    if config.execution.max_in_flight == 0 {
        return Err(ConfigError::ValidationError(
            "execution.max_in_flight must be at least 1".to_string(),
        ));
    }

    if config.persistence.backend == PersistenceBackend::File
        && config.persistence.data_dir.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "persistence.data_dir is required for the file backend".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}
