//! Prometheus metrics for the plan workflow.
//!
//! Recording functions are cheap no-ops until [`init_metrics`] installs the exporter,
//! so the workflow records unconditionally.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for execution duration (in seconds).
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // 10ms to 2 minutes
            duration_buckets: vec![
                0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a metrics configuration with a custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.duration_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(addr = %config.listen_addr, "Prometheus metrics exporter started");

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Proposal Metrics
// ============================================================================

/// Record a successfully proposed plan.
///
/// # Arguments
///
/// * `command_count` - Number of commands in the plan
/// * `with_context` - Whether a context snapshot was attached
pub fn record_plan_proposed(command_count: usize, with_context: bool) {
    counter!(
        "copilot_plans_proposed_total",
        "with_context" => with_context.to_string()
    )
    .increment(1);

    #[allow(clippy::cast_precision_loss)]
    histogram!("copilot_plan_commands").record(command_count as f64);
}

/// Record a failed proposal by error code.
pub fn record_proposal_failure(code: &str) {
    counter!("copilot_proposal_failures_total", "code" => code.to_string()).increment(1);
}

// ============================================================================
// Decision Metrics
// ============================================================================

/// Record an approval or rejection attempt.
///
/// # Arguments
///
/// * `decision` - "approve" or "reject"
/// * `outcome` - "accepted" or an error code
pub fn record_decision(decision: &str, outcome: &str) {
    counter!(
        "copilot_decisions_total",
        "decision" => decision.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Execution Metrics
// ============================================================================

/// Record one command's outcome.
///
/// # Arguments
///
/// * `kind` - Command kind (e.g., "cancel-order")
/// * `outcome` - "success", "failure" or "skipped"
/// * `failure_kind` - Failure classification, empty unless failed
pub fn record_command_outcome(kind: &str, outcome: &str, failure_kind: &str) {
    counter!(
        "copilot_command_outcomes_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string(),
        "failure_kind" => failure_kind.to_string()
    )
    .increment(1);
}

/// Record a finished plan execution.
///
/// # Arguments
///
/// * `status` - "completed", "partial" or "failed"
/// * `duration_seconds` - Wall-clock execution time
pub fn record_execution(status: &str, duration_seconds: f64) {
    counter!("copilot_executions_total", "status" => status.to_string()).increment(1);
    histogram!("copilot_execution_duration_seconds", "status" => status.to_string())
        .record(duration_seconds);
}

/// Record an execute call answered from the stored result.
pub fn record_execution_replay() {
    counter!("copilot_execution_replays_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_listens_on_9090() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(config.duration_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn recording_without_exporter_is_harmless() {
        record_plan_proposed(2, false);
        record_proposal_failure("INVALID_COMMAND");
        record_decision("approve", "accepted");
        record_command_outcome("cancel-order", "failure", "RATE_LIMITED");
        record_execution("partial", 0.2);
        record_execution_replay();
    }
}
