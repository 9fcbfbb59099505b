//! Command Plan Errors

use thiserror::Error;

use super::value_objects::CommandKind;

/// Reasons a candidate plan cannot become a `CommandPlan`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The request text was empty.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// A command named a kind outside the catalogue.
    #[error("Command {index}: unknown kind '{kind}'")]
    UnknownKind {
        /// Position in the plan.
        index: usize,
        /// Kind as proposed.
        kind: String,
    },

    /// A required parameter was absent or blank.
    #[error("Command {index}: {kind} requires parameter '{param}'")]
    MissingParameter {
        /// Position in the plan.
        index: usize,
        /// Command kind.
        kind: CommandKind,
        /// Missing parameter name.
        param: String,
    },

    /// A parameter value was null, a list or an object.
    #[error("Command {index}: parameter '{param}' must be a string, number or boolean")]
    UnsupportedValue {
        /// Position in the plan.
        index: usize,
        /// Parameter name.
        param: String,
    },

    /// A dependency did not reference an earlier command.
    #[error("Command {index}: dependsOn {depends_on} must reference an earlier command")]
    InvalidDependency {
        /// Position in the plan.
        index: usize,
        /// Referenced position.
        depends_on: usize,
    },
}

impl PlanError {
    /// Position of the offending command, if the error concerns one.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::EmptyQuery => None,
            Self::UnknownKind { index, .. }
            | Self::MissingParameter { index, .. }
            | Self::UnsupportedValue { index, .. }
            | Self::InvalidDependency { index, .. } => Some(*index),
        }
    }
}
