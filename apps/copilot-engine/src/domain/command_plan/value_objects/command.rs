//! A typed instruction for one downstream capability.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CommandKind, ParamValue};

/// Named command parameters, ordered by name.
pub type CommandParams = BTreeMap<String, ParamValue>;

/// A validated command. Immutable once part of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    kind: CommandKind,
    #[serde(default)]
    params: CommandParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    depends_on: Option<usize>,
}

impl Command {
    /// Create a command without a dependency.
    #[must_use]
    pub const fn new(kind: CommandKind, params: CommandParams) -> Self {
        Self {
            kind,
            params,
            depends_on: None,
        }
    }

    /// Declare that this command may only run after the command at `position`
    /// (zero-based, same plan) has succeeded.
    #[must_use]
    pub const fn depending_on(mut self, position: usize) -> Self {
        self.depends_on = Some(position);
        self
    }

    /// Command kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// All parameters.
    #[must_use]
    pub const fn params(&self) -> &CommandParams {
        &self.params
    }

    /// Look up a single parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Position of the command this one depends on.
    #[must_use]
    pub const fn depends_on(&self) -> Option<usize> {
        self.depends_on
    }
}
