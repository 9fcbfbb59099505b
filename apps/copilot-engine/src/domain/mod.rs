//! Domain Layer
//!
//! Pure business logic with no infrastructure dependencies beyond the port traits
//! that adapters implement.
//!
//! # Bounded Contexts
//!
//! - `command_plan`: Commands and the immutable plans that group them
//! - `draft_lifecycle`: Proposal and decision events, and the audit log port
//! - `plan_execution`: Outcomes, results and the at-most-once execution ledger
//! - `shared`: Identifiers and timestamps

pub mod command_plan;
pub mod draft_lifecycle;
pub mod plan_execution;
pub mod shared;
