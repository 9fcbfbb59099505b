//! HTTP client for the reasoning agent.
//!
//! A reasoning call is never retried here. A second call may yield a different
//! plan, so retrying is the caller's decision.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::application::ports::{ReasoningError, ReasoningOutput, ReasoningPort, ReasoningRequest};
use crate::config::ReasoningConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposeBody<'a> {
    query: &'a str,
    user_id: &'a str,
    context: &'a serde_json::Value,
}

/// Reasoning agent client.
#[derive(Debug, Clone)]
pub struct HttpReasoningClient {
    client: Client,
    url: String,
    timeout_ms: u64,
}

impl HttpReasoningClient {
    /// Create a client from config.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the HTTP client cannot be built.
    pub fn new(config: &ReasoningConfig) -> Result<Self, ReasoningError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ReasoningError::Unavailable {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.propose_path
            ),
            timeout_ms: config.timeout_ms,
        })
    }

    fn map_send_error(&self, err: &reqwest::Error) -> ReasoningError {
        if err.is_timeout() {
            ReasoningError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            ReasoningError::Unavailable {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl ReasoningPort for HttpReasoningClient {
    async fn reason(&self, request: &ReasoningRequest) -> Result<ReasoningOutput, ReasoningError> {
        let empty = serde_json::Value::Object(serde_json::Map::new());
        let body = ProposeBody {
            query: &request.query,
            user_id: request.user_id.as_str(),
            context: request.context.as_ref().map_or(&empty, |c| &c.data),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                detail = %detail,
                "Reasoning agent returned an error"
            );
            return Err(ReasoningError::Unavailable {
                message: format!("agent returned {status}: {detail}"),
            });
        }

        let text = response.text().await.map_err(|e| self.map_send_error(&e))?;
        serde_json::from_str(&text).map_err(|e| ReasoningError::Unavailable {
            message: format!("malformed agent response: {e}"),
        })
    }
}
