//! Command Plan Value Objects
//!
//! Immutable types describing what a plan asks downstream systems to do.

mod command;
mod command_kind;
mod context_snapshot;
mod param_value;
mod proposed_command;
mod rationale;

pub use command::{Command, CommandParams};
pub use command_kind::{CommandDomain, CommandKind, UnknownCommandKind};
pub use context_snapshot::ContextSnapshot;
pub use param_value::ParamValue;
pub use proposed_command::ProposedCommand;
pub use rationale::Rationale;
