//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod decide_plan;
mod execute_plan;
mod propose_plan;
mod query_plan;

pub use decide_plan::DecidePlanUseCase;
pub use execute_plan::{DispatchMode, ExecutePlanUseCase, ExecutionSettings};
pub use propose_plan::ProposePlanUseCase;
pub use query_plan::QueryPlanUseCase;
