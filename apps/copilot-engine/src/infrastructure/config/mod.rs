//! Dependency wiring.

mod container;

pub use container::{Container, build_executor_registry};
