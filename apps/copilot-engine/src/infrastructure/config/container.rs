//! Dependency Injection Container
//!
//! Manages creation and wiring of all application components.

use std::sync::Arc;

use crate::application::ports::{
    CommandExecutorPort, ContextProviderPort, ExecutorRegistry, ReasoningPort,
};
use crate::application::services::{PlanWorkflow, WorkflowSettings};
use crate::application::use_cases::{
    DecidePlanUseCase, ExecutePlanUseCase, ProposePlanUseCase, QueryPlanUseCase,
};
use crate::config::ExecutorsConfig;
use crate::domain::command_plan::CommandDomain;
use crate::domain::draft_lifecycle::AuditLogStore;
use crate::domain::plan_execution::ExecutionLedger;
use crate::infrastructure::executors::{ExecutorBuildError, HttpCommandExecutor};

/// Build the executor registry from configured domain services.
///
/// Domains without a base URL get no executor.
///
/// # Errors
///
/// Returns an error if a base URL is unusable or an HTTP client cannot be built.
pub fn build_executor_registry(
    config: &ExecutorsConfig,
) -> Result<ExecutorRegistry, ExecutorBuildError> {
    let mut registry = ExecutorRegistry::new();
    for domain in CommandDomain::ALL {
        let Some(base_url) = config.base_url(domain) else {
            tracing::warn!(
                service = domain.service_key(),
                "No base URL configured; commands for this service will be unsupported"
            );
            continue;
        };
        let executor: Arc<dyn CommandExecutorPort> = Arc::new(HttpCommandExecutor::new(
            base_url,
            config.command_timeout(),
        )?);
        registry = registry.register_domain(domain, &executor);
        tracing::info!(service = domain.service_key(), url = %base_url, "Registered command executor");
    }
    Ok(registry)
}

/// Dependency injection container.
///
/// Holds all wired dependencies for the application.
pub struct Container<R, C, A, L>
where
    R: ReasoningPort + 'static,
    C: ContextProviderPort + 'static,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    // Ports
    reasoning: Arc<R>,
    context: Arc<C>,
    audit: Arc<A>,
    ledger: Arc<L>,
    executors: ExecutorRegistry,
    settings: WorkflowSettings,
}

impl<R, C, A, L> Container<R, C, A, L>
where
    R: ReasoningPort + 'static,
    C: ContextProviderPort + 'static,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    /// Create a new container with all dependencies.
    pub fn new(
        reasoning: Arc<R>,
        context: Arc<C>,
        audit: Arc<A>,
        ledger: Arc<L>,
        executors: ExecutorRegistry,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            reasoning,
            context,
            audit,
            ledger,
            executors,
            settings,
        }
    }

    /// Get the audit log.
    pub fn audit(&self) -> Arc<A> {
        Arc::clone(&self.audit)
    }

    /// Get the execution ledger.
    pub fn ledger(&self) -> Arc<L> {
        Arc::clone(&self.ledger)
    }

    /// Get the executor registry.
    pub const fn executors(&self) -> &ExecutorRegistry {
        &self.executors
    }

    /// Create a `ProposePlanUseCase`.
    pub fn propose_plan_use_case(&self) -> ProposePlanUseCase<R, C, A> {
        ProposePlanUseCase::new(
            Arc::clone(&self.reasoning),
            Arc::clone(&self.context),
            Arc::clone(&self.audit),
            self.settings.reasoning_timeout,
        )
    }

    /// Create a `DecidePlanUseCase`.
    pub fn decide_plan_use_case(&self) -> DecidePlanUseCase<A> {
        DecidePlanUseCase::new(Arc::clone(&self.audit), self.settings.max_reject_reason_len)
    }

    /// Create an `ExecutePlanUseCase`.
    ///
    /// Single-flight holds per use case instance; share one instance per process.
    pub fn execute_plan_use_case(&self) -> ExecutePlanUseCase<A, L> {
        ExecutePlanUseCase::new(
            Arc::clone(&self.audit),
            Arc::clone(&self.ledger),
            self.executors.clone(),
            self.settings.execution.clone(),
        )
    }

    /// Create a `QueryPlanUseCase`.
    pub fn query_plan_use_case(&self) -> QueryPlanUseCase<A, L> {
        QueryPlanUseCase::new(Arc::clone(&self.audit), Arc::clone(&self.ledger))
    }

    /// Create the caller-facing workflow.
    pub fn workflow(&self) -> PlanWorkflow<R, C, A, L> {
        PlanWorkflow::new(
            Arc::clone(&self.reasoning),
            Arc::clone(&self.context),
            Arc::clone(&self.audit),
            Arc::clone(&self.ledger),
            self.executors.clone(),
            self.settings.clone(),
        )
    }
}
