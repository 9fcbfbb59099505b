//! Untrusted command as emitted by the reasoning engine.

use serde::{Deserialize, Serialize};

use super::{Command, CommandKind, CommandParams, ParamValue};
use crate::domain::command_plan::errors::PlanError;

/// A command suggestion that has not been validated yet.
///
/// Suggested endpoints are ignored; routing is decided by configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedCommand {
    /// Kind name, in any casing.
    #[serde(alias = "commandType")]
    pub kind: String,
    /// Raw parameters.
    #[serde(default, alias = "payload")]
    pub params: serde_json::Map<String, serde_json::Value>,
    /// Optional dependency on an earlier position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<usize>,
}

impl ProposedCommand {
    /// Create a proposed command.
    #[must_use]
    pub fn new(kind: impl Into<String>, params: serde_json::Value) -> Self {
        let params = match params {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            kind: kind.into(),
            params,
            depends_on: None,
        }
    }

    /// Set the dependency position.
    #[must_use]
    pub const fn depending_on(mut self, position: usize) -> Self {
        self.depends_on = Some(position);
        self
    }

    /// Validate into a `Command` at plan position `index`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown kind, a missing required parameter, a
    /// non-primitive parameter value, or a dependency that is not an earlier position.
    pub fn validate(&self, index: usize) -> Result<Command, PlanError> {
        let kind: CommandKind = self.kind.parse().map_err(|_| PlanError::UnknownKind {
            index,
            kind: self.kind.clone(),
        })?;

        let mut params = CommandParams::new();
        for (name, raw) in &self.params {
            let value = ParamValue::from_json(raw).ok_or_else(|| PlanError::UnsupportedValue {
                index,
                param: name.clone(),
            })?;
            params.insert(name.clone(), value);
        }

        if let Some(missing) = kind
            .required_params()
            .iter()
            .find(|name| params.get(**name).is_none_or(is_blank))
        {
            return Err(PlanError::MissingParameter {
                index,
                kind,
                param: (*missing).to_string(),
            });
        }

        let command = Command::new(kind, params);
        match self.depends_on {
            None => Ok(command),
            Some(position) if position < index => Ok(command.depending_on(position)),
            Some(position) => Err(PlanError::InvalidDependency {
                index,
                depends_on: position,
            }),
        }
    }
}

fn is_blank(value: &ParamValue) -> bool {
    value.as_text().is_some_and(|s| s.trim().is_empty())
}
