//! Plan Execution Value Objects

mod command_outcome;
mod execution_status;
mod failure_kind;

pub use command_outcome::{CommandOutcome, CommandReport};
pub use execution_status::ExecutionStatus;
pub use failure_kind::FailureKind;
