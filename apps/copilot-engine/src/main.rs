//! Copilot Engine Binary
//!
//! Serves the command plan workflow over HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin copilot-engine -- config.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `COPILOT_CONFIG`: Config file path when no argument is given (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//!
//! Config values may reference any variable with `${VAR}` or `${VAR:-default}`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use copilot_engine::application::ports::{ContextProviderPort, ReasoningPort};
use copilot_engine::config::{Config, PersistenceBackend, load_config};
use copilot_engine::domain::draft_lifecycle::AuditLogStore;
use copilot_engine::domain::plan_execution::ExecutionLedger;
use copilot_engine::infrastructure::config::{Container, build_executor_registry};
use copilot_engine::infrastructure::context::HttpContextProvider;
use copilot_engine::infrastructure::http::{AppState, create_router};
use copilot_engine::infrastructure::persistence::{
    FileAuditLog, FileExecutionLedger, InMemoryAuditLog, InMemoryExecutionLedger,
};
use copilot_engine::infrastructure::reasoning::HttpReasoningClient;
use copilot_engine::observability::{MetricsConfig, init_metrics};
use copilot_engine::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("COPILOT_CONFIG").ok());
    let config = load_config(path.as_deref()).context("loading configuration")?;

    init_tracing(&config.observability.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Copilot Engine");
    log_config(&config);

    if config.observability.metrics.enabled {
        let addr: SocketAddr = config
            .observability
            .metrics
            .listen_addr
            .parse()
            .context("parsing observability.metrics.listen_addr")?;
        init_metrics(&MetricsConfig::with_addr(addr))?;
    }

    let reasoning = Arc::new(HttpReasoningClient::new(&config.reasoning)?);
    let context = Arc::new(HttpContextProvider::new(&config.context)?);
    if !context.is_enabled() {
        tracing::info!("No context provider configured; plans carry caller context only");
    }

    match config.persistence.backend {
        PersistenceBackend::Memory => {
            tracing::warn!("Using in-memory persistence; the audit log is lost on restart");
            let container = Container::new(
                reasoning,
                context,
                Arc::new(InMemoryAuditLog::new()),
                Arc::new(InMemoryExecutionLedger::new()),
                build_executor_registry(&config.executors)?,
                config.workflow_settings(),
            );
            serve(&config, &container).await
        }
        PersistenceBackend::File => {
            let data_dir = &config.persistence.data_dir;
            tokio::fs::create_dir_all(data_dir)
                .await
                .with_context(|| format!("creating data directory {data_dir}"))?;
            tracing::info!(data_dir = %data_dir, "Using file persistence");
            let container = Container::new(
                reasoning,
                context,
                Arc::new(FileAuditLog::new(data_dir)),
                Arc::new(FileExecutionLedger::new(data_dir)),
                build_executor_registry(&config.executors)?,
                config.workflow_settings(),
            );
            serve(&config, &container).await
        }
    }
}

/// Serve the REST API until a shutdown signal arrives.
async fn serve<R, C, A, L>(config: &Config, container: &Container<R, C, A, L>) -> anyhow::Result<()>
where
    R: ReasoningPort + 'static,
    C: ContextProviderPort + 'static,
    A: AuditLogStore + 'static,
    L: ExecutionLedger + 'static,
{
    tracing::info!(
        kinds = ?container.executors().supported_kinds(),
        "Command executors ready"
    );

    let state = AppState {
        workflow: Arc::new(container.workflow()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let app = create_router(state);

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "HTTP server starting");

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

fn log_config(config: &Config) {
    tracing::info!(
        reasoning_url = %config.reasoning.base_url,
        context_url = ?config.context.base_url,
        dispatch = ?config.execution.dispatch,
        max_in_flight = config.execution.max_in_flight,
        backend = ?config.persistence.backend,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Cancel `token` on SIGTERM or Ctrl+C.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    token.cancel();
}
