//! HTTP command executor for one downstream domain service.
//!
//! Each command is sent exactly once. A failed mutation may already have been
//! applied downstream, so nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::routes::route_for;
use crate::application::ports::{CommandContext, CommandExecutorPort, CommandFailure};
use crate::domain::command_plan::Command;
use crate::domain::plan_execution::FailureKind;

const CORRELATION_HEADER: &str = "X-Correlation-ID";
const USER_PLACEHOLDERS: [&str; 2] = ["{{USER_ID}}", "{USER_ID}"];

/// Errors building an executor.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorBuildError {
    /// The service base URL is not an absolute http(s) URL.
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// The configured URL.
        url: String,
        /// Why it was refused.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Executor that forwards commands to a domain service's REST API.
#[derive(Debug, Clone)]
pub struct HttpCommandExecutor {
    client: Client,
    base_url: Url,
}

/// A command resolved against its route.
struct PreparedRequest {
    method: reqwest::Method,
    segments: Vec<String>,
    body: serde_json::Value,
}

impl HttpCommandExecutor {
    /// Create an executor for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot carry a path or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ExecutorBuildError> {
        let invalid = |message: String| ExecutorBuildError::InvalidBaseUrl {
            url: base_url.to_string(),
            message,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) URL".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Resolve a command into its method, path segments and JSON body.
    fn build(command: &Command, ctx: &CommandContext) -> Result<PreparedRequest, CommandFailure> {
        let route = route_for(command.kind());
        let path_params: Vec<&str> = route.path_params().collect();

        let mut segments = Vec::new();
        for segment in route.path.split('/').filter(|s| !s.is_empty()) {
            let Some(param) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                segments.push(segment.to_string());
                continue;
            };
            let value = command
                .param(param)
                .map(ToString::to_string)
                .filter(|v| is_safe_segment(v))
                .ok_or_else(|| {
                    CommandFailure::new(
                        FailureKind::InvalidParameters,
                        format!("{param} is not a valid path segment"),
                    )
                })?;
            segments.push(value);
        }

        let mut body = serde_json::Map::new();
        for (name, value) in command.params() {
            if path_params.contains(&name.as_str()) {
                continue;
            }
            let json = match value.as_text() {
                Some(text) => serde_json::Value::String(substitute_user(text, ctx)),
                None => value.to_json(),
            };
            body.insert(name.clone(), json);
        }

        body.entry(route.actor_field)
            .or_insert_with(|| serde_json::Value::String(ctx.user_id.to_string()));

        Ok(PreparedRequest {
            method: route.method,
            segments,
            body: serde_json::Value::Object(body),
        })
    }

    /// Append percent-encoded segments to the base URL.
    fn url_for(&self, segments: &[String]) -> Result<Url, CommandFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CommandFailure::new(FailureKind::Internal, "base URL cannot carry a path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// A parameter value usable as one path segment: non-empty, not a dot segment,
/// and free of separators.
fn is_safe_segment(value: &str) -> bool {
    !value.trim().is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '?', '#'])
}

fn substitute_user(text: &str, ctx: &CommandContext) -> String {
    USER_PLACEHOLDERS
        .iter()
        .fold(text.to_string(), |acc, p| acc.replace(p, ctx.user_id.as_str()))
}

/// Classify a non-success response status.
fn categorize_status(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::TOO_MANY_REQUESTS => FailureKind::RateLimited,
        StatusCode::NOT_FOUND => FailureKind::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FailureKind::Timeout,
        s if s.is_server_error() => FailureKind::Unavailable,
        _ => FailureKind::Rejected,
    }
}

fn send_failure(err: &reqwest::Error) -> CommandFailure {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Unavailable
    };
    CommandFailure::new(kind, err.to_string())
}

/// Pull a message out of an error body: `{"error": ..}`, `{"message": ..}` or raw text.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message", "detail"]
                .iter()
                .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(str::to_string))
        });
    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        None => body.trim().to_string(),
    }
}

#[async_trait]
impl CommandExecutorPort for HttpCommandExecutor {
    async fn run(
        &self,
        command: &Command,
        ctx: &CommandContext,
    ) -> Result<serde_json::Value, CommandFailure> {
        let PreparedRequest {
            method,
            segments,
            body,
        } = Self::build(command, ctx)?;
        let url = self.url_for(&segments)?;

        tracing::debug!(
            plan_id = %ctx.plan_id,
            index = ctx.index,
            method = %method,
            url = %url,
            "Dispatching command"
        );

        let response = self
            .client
            .request(method, url)
            .header(CORRELATION_HEADER, ctx.correlation_id.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| send_failure(&e))?;
        let status = response.status();

        if status.is_success() {
            let text = response.text().await.map_err(|e| send_failure(&e))?;
            if text.trim().is_empty() {
                return Ok(serde_json::Value::Null);
            }
            return Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)));
        }

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        let kind = categorize_status(status);
        let mut message = error_message(status, &body);
        if let (FailureKind::RateLimited, Some(secs)) = (kind, retry_after) {
            message = format!("{message} (retry after {secs}s)");
        }

        tracing::warn!(
            plan_id = %ctx.plan_id,
            index = ctx.index,
            status = status.as_u16(),
            kind = %kind,
            message = %message,
            "Command failed downstream"
        );

        Err(CommandFailure::new(kind, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command_plan::{CommandKind, CommandParams, ParamValue};
    use crate::domain::shared::{CorrelationId, PlanId, UserId};
    use test_case::test_case;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> CommandContext {
        CommandContext {
            plan_id: PlanId::new("p-1"),
            user_id: UserId::new("u1"),
            correlation_id: CorrelationId::new("corr-1"),
            index: 0,
        }
    }

    fn command(kind: CommandKind, params: &[(&str, ParamValue)]) -> Command {
        let params: CommandParams = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        Command::new(kind, params)
    }

    fn executor(server: &MockServer) -> HttpCommandExecutor {
        HttpCommandExecutor::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn cancel_order_fills_path_and_actor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oms/orders/O-1/cancel"))
            .and(header("X-Correlation-ID", "corr-1"))
            .and(body_json(serde_json::json!({
                "reason": "too large",
                "cancelledBy": "u1"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cmd = command(
            CommandKind::CancelOrder,
            &[
                ("orderId", "O-1".into()),
                ("reason", "too large".into()),
            ],
        );
        let result = executor(&server).run(&cmd, &ctx()).await.unwrap();
        assert_eq!(result, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn placeholder_and_explicit_actor_are_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oms/orders"))
            .and(body_json(serde_json::json!({
                "accountId": "A-1",
                "createdBy": "ops-bot",
                "note": "for u1",
                "quantity": 100
            })))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let cmd = command(
            CommandKind::CreateOrder,
            &[
                ("accountId", "A-1".into()),
                ("createdBy", "ops-bot".into()),
                ("note", "for {{USER_ID}}".into()),
                ("quantity", ParamValue::Integer(100)),
            ],
        );
        let result = executor(&server).run(&cmd, &ctx()).await.unwrap();
        assert_eq!(result, serde_json::Value::Null);
    }

    #[test_case(429, FailureKind::RateLimited ; "rate limited")]
    #[test_case(400, FailureKind::Rejected ; "bad request")]
    #[test_case(422, FailureKind::Rejected ; "unprocessable")]
    #[test_case(404, FailureKind::NotFound ; "not found")]
    #[test_case(503, FailureKind::Unavailable ; "unavailable")]
    #[test_case(504, FailureKind::Timeout ; "gateway timeout")]
    fn status_categories(status: u16, expected: FailureKind) {
        let status = StatusCode::from_u16(status).unwrap();
        assert_eq!(categorize_status(status), expected);
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oms/orders/O-2/cancel"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "30")
                    .set_body_json(serde_json::json!({"error": "slow down"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cmd = command(CommandKind::CancelOrder, &[("orderId", "O-2".into())]);
        let failure = executor(&server).run(&cmd, &ctx()).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::RateLimited);
        assert_eq!(failure.message, "slow down (retry after 30s)");
    }

    #[tokio::test]
    async fn delete_rule_sends_actor_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/compliance/rules/R-9"))
            .and(body_partial_json(serde_json::json!({"deletedBy": "u1"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cmd = command(CommandKind::DeleteRule, &[("ruleId", "R-9".into())]);
        assert!(executor(&server).run(&cmd, &ctx()).await.is_ok());
    }

    #[test_case("../admin" ; "parent prefix")]
    #[test_case(".." ; "parent segment")]
    #[test_case("." ; "current segment")]
    #[test_case("a\\b" ; "backslash")]
    #[test_case("O-1?force=true" ; "query")]
    #[test_case("  " ; "blank")]
    #[tokio::test]
    async fn unsafe_path_segment_is_invalid(order_id: &str) {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cmd = command(CommandKind::CancelOrder, &[("orderId", order_id.into())]);
        let failure = executor(&server).run(&cmd, &ctx()).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidParameters);
    }

    #[tokio::test]
    async fn path_segment_is_percent_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oms/orders/O%201%25/cancel"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let cmd = command(CommandKind::CancelOrder, &[("orderId", "O 1%".into())]);
        assert!(executor(&server).run(&cmd, &ctx()).await.is_ok());
    }

    #[test]
    fn base_url_must_be_http() {
        let err = HttpCommandExecutor::new("ftp://oms", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ExecutorBuildError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        let executor =
            HttpCommandExecutor::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let cmd = command(CommandKind::CancelOrder, &[("orderId", "O-1".into())]);
        let failure = executor.run(&cmd, &ctx()).await.unwrap_err();
        assert!(matches!(
            failure.kind,
            FailureKind::Unavailable | FailureKind::Timeout
        ));
    }
}
