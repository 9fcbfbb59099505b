//! Command Executor Adapters
//!
//! One HTTP executor per downstream domain service. The route table maps each
//! command kind to its endpoint.

mod http;
mod routes;

pub use http::{ExecutorBuildError, HttpCommandExecutor};
pub use routes::{Route, route_for};
