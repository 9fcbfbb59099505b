//! Plan Execution Domain Services

mod schedule;

pub use schedule::ExecutionSchedule;
