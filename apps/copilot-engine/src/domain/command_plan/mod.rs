//! Command Plan Bounded Context
//!
//! A plan is an immutable, ordered set of system-mutating commands derived from one
//! natural-language request.
//!
//! # Key Concepts
//!
//! - **Command**: A typed instruction for one downstream capability
//! - **CommandPlan Aggregate**: The validated, identified plan a human reviews
//! - **ProposedCommand**: Untrusted reasoning output, validated into a `Command`

pub mod aggregate;
pub mod errors;
pub mod value_objects;

pub use aggregate::{CandidatePlan, CommandPlan};
pub use errors::PlanError;
pub use value_objects::{
    Command, CommandDomain, CommandKind, CommandParams, ContextSnapshot, ParamValue,
    ProposedCommand, Rationale, UnknownCommandKind,
};
