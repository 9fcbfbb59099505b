//! Reasoning Adapters
//!
//! - `http`: client for the reasoning agent's propose endpoint
//! - `scripted`: canned responses for tests and local runs

mod http;
mod scripted;

pub use http::HttpReasoningClient;
pub use scripted::ScriptedReasoningClient;
