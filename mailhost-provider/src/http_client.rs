//! Shared HTTP boundary for all adapters
//!
//! Adapters build a `RequestBuilder` (URL, auth header, body) and pass it to [`send`] along
//! with their [`RetryPolicy`]. The exchange is logged, transient failures are classified and
//! retried, and everything else comes back as an [`ApiResponse`] for the adapter to map.
//!
//! Transient means: transport errors and timeouts, HTTP 429, HTTP 500/502/503/504, or
//! whatever the adapter's `inspect` hook flags in an otherwise successful response (Zoho
//! reports server faults inside an HTTP 200 envelope).

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Response headers carrying a provider request id, checked in order.
const REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "x-zoho-request-id", "x-message-id"];

/// Retry behaviour of one adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying).
    pub max_retries: u32,
    /// First backoff delay; doubled on every further attempt.
    pub base_delay: Duration,
    /// Upper bound for the backoff delay.
    pub max_delay: Duration,
    /// Upper bound for a server-supplied `Retry-After`.
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retry_after: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that sends every request exactly once.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Wait before retry number `attempt + 1`.
    pub(crate) fn delay(&self, error: &ProviderError, attempt: u32) -> Duration {
        if let ProviderError::RateLimited {
            retry_after: Some(secs),
            ..
        } = error
        {
            return Duration::from_secs(*secs).min(self.max_retry_after);
        }
        let factor = 1_u32 << attempt.min(20);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// A completed HTTP exchange that was not classified as transient.
#[derive(Debug, Clone)]
pub(crate) struct ApiResponse {
    pub status: u16,
    pub body: String,
    pub request_id: Option<String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self, provider: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            log::error!(
                "[{provider}] Unexpected response shape ({e}): {}",
                truncate_for_log(&self.body)
            );
            ProviderError::ParseError {
                provider: provider.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

/// `"PUT https://…"` for log lines, when the request can be inspected.
fn describe(request: &RequestBuilder) -> String {
    request
        .try_clone()
        .and_then(|r| r.build().ok())
        .map_or_else(
            || "<request>".to_string(),
            |r| format!("{} {}", r.method(), r.url()),
        )
}

fn transport_error(provider: &str, error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            detail: error.to_string(),
        }
    } else {
        ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: error.to_string(),
        }
    }
}

/// One attempt: send, read the body, classify the status.
async fn attempt(
    provider: &str,
    label: &str,
    request: RequestBuilder,
    inspect: &(dyn Fn(&ApiResponse) -> Option<ProviderError> + Sync),
) -> Result<ApiResponse> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, &e))?;

    let status = response.status().as_u16();
    let headers = response.headers();
    let request_id = REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let retry_after = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

    log::debug!(
        "[{provider}] {label} -> {status} (request id {})",
        request_id.as_deref().unwrap_or("-")
    );
    log::debug!("[{provider}] Response body: {}", truncate_for_log(&body));

    match status {
        429 => Err(ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after,
            raw_message: Some(truncate_for_log(&body)),
        }),
        500 | 502..=504 => Err(ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
        }),
        _ => {
            let response = ApiResponse {
                status,
                body,
                request_id,
            };
            match inspect(&response) {
                Some(error) => Err(error),
                None => Ok(response),
            }
        }
    }
}

/// Send `request`, retrying transient failures under `policy`.
///
/// `inspect` may turn a response into a transient error; return `None` to accept it.
/// Non-transient errors and the last transient error after exhausting retries are returned
/// as is. A request whose body cannot be cloned is sent once.
pub(crate) async fn send(
    provider: &str,
    request: RequestBuilder,
    policy: &RetryPolicy,
    inspect: impl Fn(&ApiResponse) -> Option<ProviderError> + Sync,
) -> Result<ApiResponse> {
    let label = describe(&request);
    let mut request = request;
    let mut attempt_no = 0;

    loop {
        let spare = if attempt_no < policy.max_retries {
            let spare = request.try_clone();
            if spare.is_none() {
                log::warn!("[{provider}] {label}: request not cloneable, sending once");
            }
            spare
        } else {
            None
        };

        match (attempt(provider, &label, request, &inspect).await, spare) {
            (Err(e), Some(next)) if e.is_retryable() => {
                let delay = policy.delay(&e, attempt_no);
                attempt_no += 1;
                log::warn!(
                    "[{provider}] {label} failed (attempt {attempt_no}/{}), retrying in {:.1}s: {e}",
                    policy.max_retries + 1,
                    delay.as_secs_f32()
                );
                tokio::time::sleep(delay).await;
                request = next;
            }
            (result, _) => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited(secs: Option<u64>) -> ProviderError {
        ProviderError::RateLimited {
            provider: "test".into(),
            retry_after: secs,
            raw_message: None,
        }
    }

    fn network() -> ProviderError {
        ProviderError::NetworkError {
            provider: "test".into(),
            detail: "HTTP 503".into(),
        }
    }

    #[test]
    fn default_backoff_doubles_from_100ms() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..4).map(|a| policy.delay(&network(), a)).collect();
        assert_eq!(
            delays,
            [100, 200, 400, 800].map(Duration::from_millis).to_vec()
        );
    }

    #[test]
    fn backoff_capped_at_max_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(&network(), 7), Duration::from_secs(10));
        assert_eq!(policy.delay(&network(), 63), Duration::from_secs(10));
    }

    #[test]
    fn retry_after_honoured_and_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(&rate_limited(Some(5)), 0), Duration::from_secs(5));
        assert_eq!(policy.delay(&rate_limited(Some(3600)), 0), Duration::from_secs(30));
        // Without a header the backoff applies
        assert_eq!(policy.delay(&rate_limited(None), 1), Duration::from_millis(200));
    }

    #[test]
    fn custom_base_delay() {
        let policy = RetryPolicy::no_retry()
            .with_max_retries(3)
            .with_base_delay(Duration::from_millis(5));
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay(&network(), 2), Duration::from_millis(20));
    }

    #[test]
    fn response_json_reports_parse_error() {
        let response = ApiResponse {
            status: 200,
            body: "not json".into(),
            request_id: None,
        };
        assert!(response.is_success());
        let parsed: Result<serde_json::Value> = response.json("test");
        assert!(matches!(parsed, Err(ProviderError::ParseError { .. })));
    }
}
