//! Observability module for metrics.
//!
//! Tracing setup lives in `crate::telemetry`.

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_command_outcome, record_decision,
    record_execution, record_execution_replay, record_plan_proposed, record_proposal_failure,
};
