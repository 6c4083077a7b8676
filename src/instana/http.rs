//! HTTP utilities for Instana REST API calls

use super::error::RestError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            body.chars().take(MAX_LOG_BODY_LENGTH).collect::<String>(),
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Retry behaviour for idempotent requests answered with 429/502/503/504
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; grows linearly with each attempt
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// HTTP client wrapper for Instana API calls
#[derive(Clone)]
pub struct InstanaHttpClient {
    client: Client,
    api_token: String,
    retry: RetryPolicy,
}

impl InstanaHttpClient {
    /// Create a new HTTP client authenticating with the given API token
    pub fn new(api_token: &str, tls_skip_verify: bool, retry: RetryPolicy) -> Result<Self, RestError> {
        let client = Client::builder()
            .user_agent(concat!("instana-provider/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(tls_skip_verify)
            .build()?;

        Ok(Self {
            client,
            api_token: api_token.to_string(),
            retry,
        })
    }

    /// Make a GET request; an empty body is a decode failure
    pub async fn get(&self, url: &str) -> Result<Value, RestError> {
        self.send(Method::GET, url, None)
            .await?
            .ok_or_else(|| RestError::Decode(format!("empty response body from {}", url)))
    }

    /// Make a PUT request, optionally with a JSON body
    pub async fn put(&self, url: &str, body: Option<&Value>) -> Result<Option<Value>, RestError> {
        self.send(Method::PUT, url, body).await
    }

    /// Make a POST request, optionally with a JSON body
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Option<Value>, RestError> {
        self.send(Method::POST, url, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<(), RestError> {
        self.send(Method::DELETE, url, None).await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, RestError> {
        let idempotent = method != Method::POST;
        let mut attempt: u32 = 0;

        loop {
            tracing::debug!("{} {}", method, url);

            let mut request = self
                .client
                .request(method.clone(), url)
                .header(AUTHORIZATION, format!("apiToken {}", self.api_token));

            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            let response_body = response.text().await?;

            if status.is_success() {
                // Handle empty response
                if response_body.trim().is_empty() {
                    return Ok(None);
                }
                return serde_json::from_str(&response_body)
                    .map(Some)
                    .map_err(RestError::from);
            }

            if idempotent
                && RestError::is_retryable_status(status.as_u16())
                && attempt < self.retry.max_retries
            {
                attempt += 1;
                tracing::warn!(
                    "{} {} returned {}, retrying ({}/{})",
                    method,
                    url,
                    status,
                    attempt,
                    self.retry.max_retries
                );
                tokio::time::sleep(self.retry.delay(attempt)).await;
                continue;
            }

            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(status_error(status, url, response_body));
        }
    }
}

/// Classify a non-success status; the body is kept verbatim
fn status_error(status: StatusCode, url: &str, body: String) -> RestError {
    match status.as_u16() {
        404 => RestError::NotFound {
            url: url.to_string(),
        },
        code @ (400 | 409 | 422) => RestError::Validation {
            status: code,
            message: body,
        },
        code => RestError::Transport(format!("API request failed with status {}: {}", code, body)),
    }
}
