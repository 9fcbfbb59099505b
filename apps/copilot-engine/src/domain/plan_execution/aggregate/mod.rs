//! Execution Result Aggregate

mod execution_result;

pub use execution_result::ExecutionResult;
