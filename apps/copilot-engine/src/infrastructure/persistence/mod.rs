//! Persistence Adapters
//!
//! Implementations of the audit log and execution ledger ports.
//!
//! - `in_memory`: process-local stores for tests and development
//! - `file`: durable JSON-lines event log and execution records on local disk

pub mod file;
pub mod in_memory;

pub use file::{FileAuditLog, FileExecutionLedger};
pub use in_memory::{InMemoryAuditLog, InMemoryExecutionLedger};
