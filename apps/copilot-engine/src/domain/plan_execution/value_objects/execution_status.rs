//! Overall execution status, derived from command outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::CommandOutcome;

/// Overall status of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Every command succeeded. A plan with no commands is completed.
    Completed,
    /// At least one command succeeded and at least one failed or was skipped.
    Partial,
    /// No command succeeded.
    Failed,
}

impl ExecutionStatus {
    /// Derive the status from per-command outcomes.
    pub fn derive<'a>(outcomes: impl IntoIterator<Item = &'a CommandOutcome>) -> Self {
        let (succeeded, total) = outcomes
            .into_iter()
            .fold((0_usize, 0_usize), |(ok, n), o| {
                (ok + usize::from(o.is_success()), n + 1)
            });

        if succeeded == total {
            Self::Completed
        } else if succeeded == 0 {
            Self::Failed
        } else {
            Self::Partial
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan_execution::FailureKind;
    use proptest::prelude::*;

    fn outcome(code: u8) -> CommandOutcome {
        match code % 3 {
            0 => CommandOutcome::Success {
                result: serde_json::Value::Null,
            },
            1 => CommandOutcome::failure(FailureKind::Rejected, "no"),
            _ => CommandOutcome::Skipped { blocked_by: 0 },
        }
    }

    #[test]
    fn empty_is_completed() {
        assert_eq!(ExecutionStatus::derive(&Vec::<CommandOutcome>::new()), ExecutionStatus::Completed);
    }

    #[test]
    fn mixed_is_partial() {
        let outcomes = [outcome(0), outcome(1)];
        assert_eq!(ExecutionStatus::derive(&outcomes), ExecutionStatus::Partial);
    }

    #[test]
    fn skipped_only_is_failed() {
        let outcomes = [outcome(2), outcome(2)];
        assert_eq!(ExecutionStatus::derive(&outcomes), ExecutionStatus::Failed);
    }

    proptest! {
        #[test]
        fn status_matches_success_count(codes in proptest::collection::vec(any::<u8>(), 1..20)) {
            let outcomes: Vec<_> = codes.iter().copied().map(outcome).collect();
            let ok = outcomes.iter().filter(|o| o.is_success()).count();
            let status = ExecutionStatus::derive(&outcomes);

            if ok == outcomes.len() {
                prop_assert_eq!(status, ExecutionStatus::Completed);
            } else if ok == 0 {
                prop_assert_eq!(status, ExecutionStatus::Failed);
            } else {
                prop_assert_eq!(status, ExecutionStatus::Partial);
            }
        }

        #[test]
        fn status_ignores_order(mut codes in proptest::collection::vec(any::<u8>(), 0..20)) {
            let before = ExecutionStatus::derive(&codes.iter().copied().map(outcome).collect::<Vec<_>>());
            codes.reverse();
            let after = ExecutionStatus::derive(&codes.iter().copied().map(outcome).collect::<Vec<_>>());
            prop_assert_eq!(before, after);
        }
    }
}
