//! Retry logic with exponential backoff and jitter.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use tracing::{debug, warn};

use super::{PolicyContext, RequestPolicy, SendThunk};
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};
use crate::transport::HttpResponse;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial backoff delay.
    pub initial_backoff: Duration,
    /// Maximum backoff delay.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0 to 1.0).
    pub jitter: f64,
    /// Status codes treated as transient.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: 0.1,
            retry_on_status: vec![408, 429, 502, 503, 504],
        }
    }
}

/// Retries transient faults and status codes with exponential backoff.
///
/// A response whose status is not listed in
/// [`RetryConfig::retry_on_status`] is returned as is, so the Result layer
/// still sees every 400 and 500.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Creates a new retry policy.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Calculates the backoff delay with jitter.
    fn calculate_backoff(&self, attempt: u32, server_retry_after: Option<Duration>) -> Duration {
        // Use server's retry-after if available
        if let Some(retry_after) = server_retry_after {
            return retry_after.min(self.config.max_backoff);
        }

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay =
            self.config.initial_backoff.as_secs_f64() * self.config.backoff_multiplier.powi(exponent);

        let capped_delay = base_delay.min(self.config.max_backoff.as_secs_f64());

        let jitter_range = capped_delay * self.config.jitter;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
        let final_delay = (capped_delay + jitter).max(0.0);

        Duration::from_secs_f64(final_delay)
    }

    fn should_retry(&self, outcome: &DocumentLibraryResult<HttpResponse>) -> (bool, Option<Duration>) {
        match outcome {
            Ok(response) => (
                self.config.retry_on_status.contains(&response.status.as_u16()),
                retry_after(&response.headers),
            ),
            Err(error) => (error.is_retryable(), None),
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl RequestPolicy for RetryPolicy {
    async fn execute(
        &self,
        context: &PolicyContext,
        send: SendThunk,
    ) -> DocumentLibraryResult<HttpResponse> {
        let mut attempt = 0;

        loop {
            if context.cancellation.is_cancelled() {
                return Err(DocumentLibraryError::Cancelled);
            }

            let outcome = send.send().await;
            let (retry, server_retry_after) = self.should_retry(&outcome);

            if !retry || attempt >= self.config.max_retries {
                if attempt > 0 {
                    debug!(
                        operation = context.operation.name(),
                        attempts = attempt + 1,
                        "Retry loop finished"
                    );
                }
                return outcome;
            }

            let delay = self.calculate_backoff(attempt, server_retry_after);
            match &outcome {
                Ok(response) => warn!(
                    operation = context.operation.name(),
                    attempt = attempt + 1,
                    status = response.status.as_u16(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Transient status, retrying"
                ),
                Err(error) => warn!(
                    operation = context.operation.name(),
                    attempt = attempt + 1,
                    error = %error,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Transient fault, retrying"
                ),
            }

            // The discarded response releases its connection here.
            drop(outcome);

            tokio::select! {
                () = context.cancellation.cancelled() => return Err(DocumentLibraryError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Operation;
    use crate::transport::ByteStream;
    use reqwest::header::HeaderValue;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            jitter: 0.0,
            ..Default::default()
        }
    }

    fn context() -> PolicyContext {
        PolicyContext::new(Operation::ListLibraries, CancellationToken::new())
    }

    /// Answers with the given statuses in order, repeating the last one.
    fn statuses(codes: Vec<u16>, attempts: Arc<AtomicU32>) -> SendThunk {
        SendThunk::new(move || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) as usize;
            let code = codes[n.min(codes.len() - 1)];
            Box::pin(async move {
                Ok(HttpResponse::new(
                    StatusCode::from_u16(code).unwrap(),
                    HeaderMap::new(),
                    ByteStream::empty(),
                ))
            })
        })
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(fast_config(3));

        let response = policy
            .execute(&context(), statuses(vec![200], Arc::clone(&attempts)))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_status_is_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(fast_config(3));

        let response = policy
            .execute(&context(), statuses(vec![503, 503, 200], Arc::clone(&attempts)))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_documented_error_status_is_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(fast_config(3));

        let response = policy
            .execute(&context(), statuses(vec![500], Arc::clone(&attempts)))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted_returns_last_response() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(fast_config(2));

        let response = policy
            .execute(&context(), statuses(vec![503], Arc::clone(&attempts)))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fault() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let send = SendThunk::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(DocumentLibraryError::validation("bad")) })
        });

        let result = RetryPolicy::new(fast_config(3)).execute(&context(), send).await;

        assert!(matches!(result, Err(DocumentLibraryError::Validation { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_during_backoff_stops_retrying() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 5,
            initial_backoff: Duration::from_secs(30),
            jitter: 0.0,
            ..Default::default()
        });

        let token = CancellationToken::new();
        let context = PolicyContext::new(Operation::Exists, token.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let result = policy
            .execute(&context, statuses(vec![503], Arc::clone(&attempts)))
            .await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(DocumentLibraryError::Cancelled)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::new(RetryConfig {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: 0.0, // No jitter for predictable testing
            ..Default::default()
        });

        assert_eq!(policy.calculate_backoff(0, None).as_secs(), 1);
        assert_eq!(policy.calculate_backoff(1, None).as_secs(), 2);
        assert_eq!(policy.calculate_backoff(2, None).as_secs(), 4);
        assert_eq!(policy.calculate_backoff(10, None).as_secs(), 60);
    }

    #[test]
    fn test_server_retry_after_respected() {
        let policy = RetryPolicy::default();

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let server_delay = retry_after(&headers);

        assert_eq!(server_delay, Some(Duration::from_secs(7)));
        assert_eq!(policy.calculate_backoff(0, server_delay), Duration::from_secs(7));
    }
}
