//! HTTP context provider.
//!
//! Fetches a JSON snapshot of current system state and stamps it on arrival.

use async_trait::async_trait;
use reqwest::Client;

use crate::application::ports::{ContextError, ContextProviderPort};
use crate::config::ContextConfig;
use crate::domain::command_plan::ContextSnapshot;

/// Context provider backed by an HTTP endpoint.
///
/// Without a configured base URL the provider is disabled: it reports
/// unhealthy and never issues a request.
#[derive(Debug, Clone)]
pub struct HttpContextProvider {
    client: Client,
    endpoints: Option<Endpoints>,
}

#[derive(Debug, Clone)]
struct Endpoints {
    snapshot: String,
    health: String,
}

impl HttpContextProvider {
    /// Create a provider from config.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the HTTP client cannot be built.
    pub fn new(config: &ContextConfig) -> Result<Self, ContextError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ContextError::Unavailable {
                message: e.to_string(),
            })?;

        let endpoints = config
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| {
                let base = url.trim_end_matches('/');
                Endpoints {
                    snapshot: format!("{base}{}", config.snapshot_path),
                    health: format!("{base}{}", config.health_path),
                }
            });

        Ok(Self { client, endpoints })
    }

    /// Whether a provider URL is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.endpoints.is_some()
    }
}

#[async_trait]
impl ContextProviderPort for HttpContextProvider {
    async fn snapshot(&self) -> Result<ContextSnapshot, ContextError> {
        let Some(endpoints) = &self.endpoints else {
            return Err(ContextError::Unavailable {
                message: "context provider not configured".to_string(),
            });
        };
        let unavailable = |e: reqwest::Error| ContextError::Unavailable {
            message: e.to_string(),
        };

        let data: serde_json::Value = self
            .client
            .get(&endpoints.snapshot)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        Ok(ContextSnapshot::capture(data))
    }

    async fn health(&self) -> bool {
        let Some(endpoints) = &self.endpoints else {
            return false;
        };
        match self.client.get(&endpoints.health).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Context provider health check failed");
                false
            }
        }
    }
}
