//! Command Plan Aggregate

mod command_plan;

pub use command_plan::{CandidatePlan, CommandPlan};
