//! HTTP/REST API adapter.
//!
//! Inbound adapter implementing REST endpoints that delegate to the plan workflow.

mod controller;
mod request;
mod response;

pub use controller::{ApiError, AppState, create_router};
pub use request::*;
pub use response::*;
