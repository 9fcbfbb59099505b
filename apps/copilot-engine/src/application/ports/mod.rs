//! Application Ports (Driven)
//!
//! Interfaces the workflow uses to reach external systems. The audit log and the
//! execution ledger are domain ports and live with their bounded contexts.

mod command_executor_port;
mod context_provider_port;
mod executor_registry;
mod reasoning_port;

pub use command_executor_port::{CommandContext, CommandExecutorPort, CommandFailure};
pub use context_provider_port::{ContextError, ContextProviderPort, NoContextProvider};
pub use executor_registry::ExecutorRegistry;
pub use reasoning_port::{ReasoningError, ReasoningOutput, ReasoningPort, ReasoningRequest};
