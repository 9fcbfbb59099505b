//! CommandPlan Aggregate Root
//!
//! An immutable plan of commands, proposed once and never altered. The plan is
//! persisted inside its proposal event, so the audit log is its only source of truth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::command_plan::errors::PlanError;
use crate::domain::command_plan::value_objects::{
    Command, ContextSnapshot, ProposedCommand, Rationale,
};
use crate::domain::shared::{PlanId, Timestamp, UserId};

/// Everything needed to create a plan, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePlan {
    /// The natural-language request.
    pub query: String,
    /// Principal who asked.
    pub user_id: UserId,
    /// Context consulted while reasoning.
    pub context: Option<ContextSnapshot>,
    /// Commands as proposed, in order.
    pub commands: Vec<ProposedCommand>,
    /// Explanation of the plan.
    pub rationale: Rationale,
    /// Assumptions the proposer made.
    pub assumptions: Vec<String>,
    /// Events the proposer expects execution to emit.
    pub expected_events: Vec<String>,
    /// Proposer confidence, clamped to `[0, 1]`.
    pub confidence: f64,
    /// UI route to navigate to after execution.
    pub route: Option<String>,
    /// Query parameters for that route.
    pub query_params: Option<BTreeMap<String, String>>,
}

impl CandidatePlan {
    /// Start a candidate with no commands and no metadata.
    #[must_use]
    pub fn new(query: impl Into<String>, user_id: UserId) -> Self {
        Self {
            query: query.into(),
            user_id,
            context: None,
            commands: Vec::new(),
            rationale: Rationale::default(),
            assumptions: Vec::new(),
            expected_events: Vec::new(),
            confidence: 0.0,
            route: None,
            query_params: None,
        }
    }
}

/// A validated, identified command plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPlan {
    plan_id: PlanId,
    query: String,
    user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<ContextSnapshot>,
    commands: Vec<Command>,
    #[serde(default)]
    rationale: Rationale,
    #[serde(default)]
    assumptions: Vec<String>,
    #[serde(default)]
    expected_events: Vec<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query_params: Option<BTreeMap<String, String>>,
    created_at: Timestamp,
}

impl CommandPlan {
    /// Validate a candidate and assign it a fresh identifier.
    ///
    /// A plan with zero commands is valid.
    ///
    /// # Errors
    ///
    /// Returns `PlanError` if the query is blank or any command fails validation.
    pub fn propose(candidate: CandidatePlan) -> Result<Self, PlanError> {
        if candidate.query.trim().is_empty() {
            return Err(PlanError::EmptyQuery);
        }

        let commands = candidate
            .commands
            .iter()
            .enumerate()
            .map(|(index, proposed)| proposed.validate(index))
            .collect::<Result<Vec<_>, _>>()?;

        let confidence = if candidate.confidence.is_finite() {
            candidate.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Ok(Self {
            plan_id: PlanId::generate(),
            query: candidate.query,
            user_id: candidate.user_id,
            context: candidate.context,
            commands,
            rationale: candidate.rationale,
            assumptions: candidate.assumptions,
            expected_events: candidate.expected_events,
            confidence,
            route: candidate.route,
            query_params: candidate.query_params,
            created_at: Timestamp::now(),
        })
    }

    /// Plan identifier.
    #[must_use]
    pub const fn plan_id(&self) -> &PlanId {
        &self.plan_id
    }

    /// Original request text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Principal who requested the plan.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Context the plan was reasoned over.
    #[must_use]
    pub const fn context(&self) -> Option<&ContextSnapshot> {
        self.context.as_ref()
    }

    /// Commands in declared order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Explanation.
    #[must_use]
    pub const fn rationale(&self) -> &Rationale {
        &self.rationale
    }

    /// Proposer assumptions.
    #[must_use]
    pub fn assumptions(&self) -> &[String] {
        &self.assumptions
    }

    /// Events the proposer expects.
    #[must_use]
    pub fn expected_events(&self) -> &[String] {
        &self.expected_events
    }

    /// Proposer confidence in `[0, 1]`.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Route to navigate to afterwards.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Route query parameters.
    #[must_use]
    pub const fn query_params(&self) -> Option<&BTreeMap<String, String>> {
        self.query_params.as_ref()
    }

    /// When the plan was created.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Whether the plan contains no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command_plan::value_objects::CommandKind;
    use serde_json::json;

    fn candidate(commands: Vec<ProposedCommand>) -> CandidatePlan {
        CandidatePlan {
            commands,
            confidence: 0.8,
            ..CandidatePlan::new("cancel order O-1", UserId::new("trader-1"))
        }
    }

    #[test]
    fn propose_assigns_fresh_identifiers() {
        let commands = vec![ProposedCommand::new("cancel-order", json!({"orderId": "O-1"}))];
        let a = CommandPlan::propose(candidate(commands.clone())).unwrap();
        let b = CommandPlan::propose(candidate(commands)).unwrap();
        assert_ne!(a.plan_id(), b.plan_id());
        assert_eq!(a.commands()[0].kind(), CommandKind::CancelOrder);
    }

    #[test]
    fn empty_plan_is_valid() {
        let plan = CommandPlan::propose(candidate(Vec::new())).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn blank_query_is_rejected() {
        let mut c = candidate(Vec::new());
        c.query = "   ".to_string();
        assert_eq!(CommandPlan::propose(c).unwrap_err(), PlanError::EmptyQuery);
    }

    #[test]
    fn first_invalid_command_fails_the_whole_plan() {
        let commands = vec![
            ProposedCommand::new("cancel-order", json!({"orderId": "O-1"})),
            ProposedCommand::new("teleport", json!({})),
        ];
        let err = CommandPlan::propose(candidate(commands)).unwrap_err();
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn confidence_is_clamped() {
        let mut c = candidate(Vec::new());
        c.confidence = 1.7;
        assert!((CommandPlan::propose(c.clone()).unwrap().confidence() - 1.0).abs() < f64::EPSILON);
        c.confidence = f64::NAN;
        assert!(CommandPlan::propose(c).unwrap().confidence().abs() < f64::EPSILON);
    }

    #[test]
    fn serde_round_trip_preserves_plan() {
        let commands = vec![
            ProposedCommand::new("approve-order", json!({"orderId": "O-1"})),
            ProposedCommand::new("send-to-ems", json!({"orderId": "O-1"})).depending_on(0),
        ];
        let plan = CommandPlan::propose(candidate(commands)).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        let back: CommandPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }
}
