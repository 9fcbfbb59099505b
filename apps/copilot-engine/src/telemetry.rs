//! Tracing Setup
//!
//! Installs the global `tracing` subscriber from [`LoggingConfig`].
//!
//! `RUST_LOG` overrides the configured level when set.
//!
//! # Usage
//!
//! ```rust,ignore
//! use copilot_engine::telemetry::init_tracing;
//!
//! let config = copilot_engine::config::load_config(None)?;
//! init_tracing(&config.observability.logging)?;
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;

/// Error installing the subscriber.
#[derive(Debug, thiserror::Error)]
#[error("failed to initialize tracing: {0}")]
pub struct TelemetryError(String);

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_span_events(span_events);

    let result = if config.format == "pretty" {
        builder.pretty().with_ansi(true).try_init()
    } else {
        builder.json().with_current_span(config.include_spans).try_init()
    };
    result.map_err(|e| TelemetryError(e.to_string()))?;

    tracing::info!(
        level = %config.level,
        format = %config.format,
        "Tracing initialized"
    );
    Ok(())
}
