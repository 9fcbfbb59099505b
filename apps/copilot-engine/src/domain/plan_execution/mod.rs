//! Plan Execution Bounded Context
//!
//! Running an approved plan at most once and recording what happened to each command.
//!
//! # Key Concepts
//!
//! - **CommandOutcome**: success, failure, or skipped because a dependency did not succeed
//! - **ExecutionResult**: the single record of a plan's execution
//! - **ExecutionStatus**: derived from outcomes, never stored
//! - **ExecutionLedger**: exclusive claim plus result storage, keyed by plan

pub mod aggregate;
pub mod errors;
pub mod ledger;
pub mod services;
pub mod value_objects;

pub use aggregate::ExecutionResult;
pub use errors::LedgerError;
pub use ledger::{Claim, ExecutionLedger};
pub use services::ExecutionSchedule;
pub use value_objects::{CommandOutcome, CommandReport, ExecutionStatus, FailureKind};
