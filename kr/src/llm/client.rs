//! LlmClient trait and the HTTP plumbing shared by providers

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Retry schedule for transient failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based), doubling each time
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(retry.saturating_sub(1))
    }

    /// Run `send` until it succeeds, fails permanently, or retries run out
    pub async fn run<T, F, Fut>(&self, provider: &'static str, mut send: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut retry = 0;
        loop {
            match send().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retry < self.max_retries => {
                    retry += 1;
                    let backoff = self.backoff(retry);
                    warn!(
                        provider,
                        attempt = retry,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Retrying after transient error"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    debug!(provider, retry, error = %e, "RetryPolicy::run: giving up");
                    return Err(e);
                }
            }
        }
    }
}

/// Map a transport error, distinguishing client-side timeouts
pub(crate) fn transport_error(e: reqwest::Error, timeout: Duration) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(timeout)
    } else {
        LlmError::Network(e)
    }
}

/// Turn non-success statuses into errors, passing successful responses through
pub(crate) async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status().as_u16();

    if status == 429 {
        debug!("check_status: rate limited (429)");
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        return Err(LlmError::RateLimited {
            retry_after: Duration::from_secs(retry_after),
        });
    }

    if !response.status().is_success() {
        debug!(status, "check_status: API error");
        let message = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError { status, message });
    }

    Ok(response)
}


#[cfg(test)]
mod tests {
    use super::mock::MockLlmClient;
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff(3), Duration::from_millis(4000));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = &AtomicU32::new(0);
        let result = instant()
            .run("test", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(LlmError::ApiError {
                        status: 503,
                        message: "busy".to_string(),
                    })
                } else {
                    Ok("ok")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = instant()
            .run("test", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::ApiError {
                    status: 500,
                    message: "down".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(LlmError::ApiError { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = instant()
            .run("test", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::RateLimited {
                    retry_after: Duration::from_secs(5),
                })
            })
            .await;

        assert!(result.unwrap_err().is_rate_limit());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mock_client_returns_responses() {
        let client = MockLlmClient::texts(&["Response 1", "Response 2"]);
        let req = CompletionRequest::single("Test", "hello", 1000);

        let resp1 = client.complete(req.clone()).await.unwrap();
        assert_eq!(resp1.content, Some("Response 1".to_string()));

        let resp2 = client.complete(req.clone()).await.unwrap();
        assert_eq!(resp2.content, Some("Response 2".to_string()));

        assert!(client.complete(req).await.is_err());
        assert_eq!(client.requests().len(), 3);
    }
}
