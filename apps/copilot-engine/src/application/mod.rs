//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for the reasoning service, context provider and command executors
//! - **Use Cases**: Propose, decide, execute and query plans
//! - **DTOs**: Request and response types for the caller-facing API
//! - **Services**: The `PlanWorkflow` facade that callers use

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
