//! Application Services
//!
//! The caller-facing workflow API.

mod plan_workflow;

pub use plan_workflow::{PlanWorkflow, WorkflowSettings};
