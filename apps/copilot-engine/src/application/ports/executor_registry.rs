//! Dispatch table from command kind to executor.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::CommandExecutorPort;
use crate::domain::command_plan::{CommandDomain, CommandKind};

/// One executor per command kind, fixed at registration time.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<CommandKind, Arc<dyn CommandExecutorPort>>,
}

impl ExecutorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor for one kind, replacing any previous one.
    #[must_use]
    pub fn register(mut self, kind: CommandKind, executor: Arc<dyn CommandExecutorPort>) -> Self {
        self.executors.insert(kind, executor);
        self
    }

    /// Register an executor for every kind of a domain service.
    #[must_use]
    pub fn register_domain(
        mut self,
        domain: CommandDomain,
        executor: &Arc<dyn CommandExecutorPort>,
    ) -> Self {
        for kind in CommandKind::for_domain(domain) {
            self.executors.insert(kind, Arc::clone(executor));
        }
        self
    }

    /// Executor for a kind, if registered.
    #[must_use]
    pub fn resolve(&self, kind: CommandKind) -> Option<Arc<dyn CommandExecutorPort>> {
        self.executors.get(&kind).cloned()
    }

    /// Registered kinds, in catalogue order.
    #[must_use]
    pub fn supported_kinds(&self) -> Vec<CommandKind> {
        CommandKind::ALL
            .into_iter()
            .filter(|k| self.executors.contains_key(k))
            .collect()
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("kinds", &self.supported_kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{CommandContext, CommandFailure};
    use crate::domain::command_plan::Command;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl CommandExecutorPort for Echo {
        async fn run(
            &self,
            command: &Command,
            _context: &CommandContext,
        ) -> Result<serde_json::Value, CommandFailure> {
            Ok(serde_json::json!({ "kind": command.kind().as_str() }))
        }
    }

    #[test]
    fn register_domain_covers_its_kinds_only() {
        let echo: Arc<dyn CommandExecutorPort> = Arc::new(Echo);
        let registry = ExecutorRegistry::new().register_domain(CommandDomain::Compliance, &echo);

        assert!(registry.resolve(CommandKind::EnableRule).is_some());
        assert!(registry.resolve(CommandKind::PublishRuleSet).is_some());
        assert!(registry.resolve(CommandKind::CancelOrder).is_none());
        assert_eq!(registry.supported_kinds().len(), 4);
    }

    #[test]
    fn register_single_kind() {
        let registry = ExecutorRegistry::new().register(CommandKind::CancelOrder, Arc::new(Echo));
        assert_eq!(registry.supported_kinds(), vec![CommandKind::CancelOrder]);
    }
}
