//! Draft lifecycle events.
//!
//! Events are immutable once written. The store never updates or deletes them.

use serde::{Deserialize, Serialize};

use crate::domain::command_plan::CommandPlan;
use crate::domain::shared::{CorrelationId, EventId, PlanId, Timestamp, UserId};

/// Version of the event envelope written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// A single lifecycle transition of a plan, with its envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEvent {
    /// Unique event identifier.
    pub event_id: EventId,
    /// Plan the event belongs to.
    pub plan_id: PlanId,
    /// Principal who caused the transition.
    pub user_id: UserId,
    /// When the transition happened.
    pub occurred_at: Timestamp,
    /// Request the transition was part of.
    pub correlation_id: CorrelationId,
    /// Envelope schema version.
    pub schema_version: u32,
    /// Variant-specific payload.
    #[serde(flatten)]
    pub payload: DraftEventPayload,
}

/// Variant-specific part of a draft event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum DraftEventPayload {
    /// A plan was proposed. Carries the full plan.
    #[serde(rename = "AI_DRAFT_PROPOSED")]
    Proposed {
        /// The proposed plan.
        plan: Box<CommandPlan>,
    },
    /// The plan was approved for execution.
    #[serde(rename = "AI_DRAFT_APPROVED")]
    Approved,
    /// The plan was rejected.
    #[serde(rename = "AI_DRAFT_REJECTED")]
    Rejected {
        /// Optional free-text reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl DraftEvent {
    fn envelope(
        plan_id: PlanId,
        user_id: UserId,
        correlation_id: CorrelationId,
        payload: DraftEventPayload,
    ) -> Self {
        Self {
            event_id: EventId::generate(),
            plan_id,
            user_id,
            occurred_at: Timestamp::now(),
            correlation_id,
            schema_version: SCHEMA_VERSION,
            payload,
        }
    }

    /// Proposal event for a freshly created plan.
    #[must_use]
    pub fn proposed(plan: CommandPlan, correlation_id: CorrelationId) -> Self {
        Self::envelope(
            plan.plan_id().clone(),
            plan.user_id().clone(),
            correlation_id,
            DraftEventPayload::Proposed {
                plan: Box::new(plan),
            },
        )
    }

    /// Approval event.
    #[must_use]
    pub fn approved(plan_id: PlanId, user_id: UserId, correlation_id: CorrelationId) -> Self {
        Self::envelope(plan_id, user_id, correlation_id, DraftEventPayload::Approved)
    }

    /// Rejection event.
    #[must_use]
    pub fn rejected(
        plan_id: PlanId,
        user_id: UserId,
        reason: Option<String>,
        correlation_id: CorrelationId,
    ) -> Self {
        Self::envelope(
            plan_id,
            user_id,
            correlation_id,
            DraftEventPayload::Rejected { reason },
        )
    }

    /// Wire name of the event type.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self.payload {
            DraftEventPayload::Proposed { .. } => "AI_DRAFT_PROPOSED",
            DraftEventPayload::Approved => "AI_DRAFT_APPROVED",
            DraftEventPayload::Rejected { .. } => "AI_DRAFT_REJECTED",
        }
    }

    /// The plan, if this is a proposal event.
    #[must_use]
    pub fn plan(&self) -> Option<&CommandPlan> {
        match &self.payload {
            DraftEventPayload::Proposed { plan } => Some(plan),
            _ => None,
        }
    }

    /// Whether this event is an approval or a rejection.
    #[must_use]
    pub const fn is_decision(&self) -> bool {
        !matches!(self.payload, DraftEventPayload::Proposed { .. })
    }
}
