//! Dependency-aware scheduling of a plan's commands.

use crate::domain::command_plan::Command;
use crate::domain::plan_execution::value_objects::CommandOutcome;

/// Groups a plan's commands into levels that may run concurrently.
///
/// A command's level is one more than its dependency's level, so every dependency
/// finishes in an earlier level. Commands within a level keep declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSchedule {
    levels: Vec<Vec<usize>>,
}

impl ExecutionSchedule {
    /// Build the schedule. Dependencies must point to earlier positions.
    #[must_use]
    pub fn build(commands: &[Command]) -> Self {
        let mut depth: Vec<usize> = Vec::with_capacity(commands.len());
        let mut levels: Vec<Vec<usize>> = Vec::new();

        for (index, command) in commands.iter().enumerate() {
            let level = command
                .depends_on()
                .and_then(|dep| depth.get(dep).copied())
                .map_or(0, |d: usize| d + 1);
            depth.push(level);
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            if let Some(slot) = levels.get_mut(level) {
                slot.push(index);
            }
        }

        Self { levels }
    }

    /// Positions grouped by level, earliest first.
    #[must_use]
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    /// The dependency that prevents `command` from running, given outcomes so far.
    ///
    /// Returns `None` when the command has no dependency or its dependency succeeded.
    #[must_use]
    pub fn blocker(command: &Command, outcomes: &[Option<CommandOutcome>]) -> Option<usize> {
        let dep = command.depends_on()?;
        match outcomes.get(dep) {
            Some(Some(outcome)) if outcome.is_success() => None,
            _ => Some(dep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command_plan::{CommandKind, CommandParams};
    use crate::domain::plan_execution::FailureKind;

    fn cmd(dep: Option<usize>) -> Command {
        let c = Command::new(CommandKind::ApproveOrder, CommandParams::new());
        match dep {
            Some(d) => c.depending_on(d),
            None => c,
        }
    }

    #[test]
    fn independent_commands_share_a_level() {
        let schedule = ExecutionSchedule::build(&[cmd(None), cmd(None), cmd(None)]);
        let expected: Vec<Vec<usize>> = vec![vec![0, 1, 2]];
        assert_eq!(schedule.levels(), expected.as_slice());
    }

    #[test]
    fn chains_are_layered() {
        let schedule = ExecutionSchedule::build(&[cmd(None), cmd(Some(0)), cmd(None), cmd(Some(1))]);
        let expected: Vec<Vec<usize>> = vec![vec![0, 2], vec![1], vec![3]];
        assert_eq!(schedule.levels(), expected.as_slice());
    }

    #[test]
    fn empty_plan_has_no_levels() {
        assert!(ExecutionSchedule::build(&[]).levels().is_empty());
    }

    #[test]
    fn blocker_reports_unsuccessful_dependency() {
        let ok = Some(CommandOutcome::Success {
            result: serde_json::Value::Null,
        });
        let failed = Some(CommandOutcome::failure(FailureKind::Rejected, "no"));

        assert_eq!(ExecutionSchedule::blocker(&cmd(None), &[failed.clone()]), None);
        assert_eq!(ExecutionSchedule::blocker(&cmd(Some(0)), &[ok]), None);
        assert_eq!(ExecutionSchedule::blocker(&cmd(Some(0)), &[failed]), Some(0));
        assert_eq!(
            ExecutionSchedule::blocker(&cmd(Some(0)), &[Some(CommandOutcome::Skipped { blocked_by: 0 })]),
            Some(0)
        );
    }
}
