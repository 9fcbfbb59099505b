//! Draft Lifecycle Bounded Context
//!
//! Proposal, approval and rejection of command plans, recorded as append-only events.
//! The lifecycle status of a plan is never stored; it is derived by replaying events.

pub mod errors;
pub mod events;
pub mod store;
pub mod value_objects;

pub use errors::AuditError;
pub use events::{DraftEvent, DraftEventPayload, SCHEMA_VERSION};
pub use store::{AuditLogStore, check_append};
pub use value_objects::DraftStatus;
