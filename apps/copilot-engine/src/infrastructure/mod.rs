//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - **Driven Adapters (Outbound)**
//!   - `persistence/`: audit log and execution ledger stores (memory, files)
//!   - `reasoning/`: reasoning agent client
//!   - `context/`: context provider client
//!   - `executors/`: domain service command executors
//!
//! - **Driver Adapters (Inbound)**
//!   - `http/`: REST API controller
//!
//! - `config/`: dependency wiring

pub mod config;
pub mod context;
pub mod executors;
pub mod http;
pub mod persistence;
pub mod reasoning;
