//! Oracle invocation with timeout, retry and response decoding

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::response::OracleResponse;
use relex_domain::{Oracle, OutputSchema};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Exponential backoff policy for failed oracle calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_retries = 0` disables retrying
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Policy described by an extractor config
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(
            config.max_retries,
            config.retry_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// Retries allowed after the first attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (1-based), capped at the maximum
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Issues oracle calls on behalf of the strategies
///
/// The oracle itself is synchronous, so every call runs on the blocking pool
/// under a timeout. Oracle errors and undecodable output are retried; the
/// last error is returned once the policy is exhausted.
///
/// A timeout is returned immediately. The blocking task cannot be cancelled,
/// so retrying would put a second call in flight next to the abandoned one.
pub struct OracleCaller<O> {
    oracle: Arc<O>,
    call_timeout: Duration,
    retry: RetryPolicy,
}

impl<O> OracleCaller<O>
where
    O: Oracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a caller from the extractor config
    pub fn new(oracle: Arc<O>, config: &ExtractorConfig) -> Self {
        Self {
            oracle,
            call_timeout: config.oracle_timeout(),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Submit one prompt pair and decode the answer as `schema`
    pub async fn call(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: OutputSchema,
    ) -> Result<OracleResponse, ExtractorError> {
        let mut attempt = 0;

        loop {
            match self.attempt(system_prompt, user_prompt, schema).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!(
                            schema = schema.as_str(),
                            attempts = attempt + 1,
                            "Oracle call succeeded after retries"
                        );
                    }
                    return Ok(response);
                }
                Err(e @ ExtractorError::Timeout(_)) => {
                    warn!(
                        schema = schema.as_str(),
                        attempts = attempt + 1,
                        error = %e,
                        "Oracle call timed out, not retrying"
                    );
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries() {
                        warn!(
                            schema = schema.as_str(),
                            attempts = attempt,
                            error = %e,
                            "Oracle call failed after max retries"
                        );
                        return Err(e);
                    }

                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        schema = schema.as_str(),
                        attempt = attempt,
                        max_retries = self.retry.max_retries(),
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Oracle call failed, retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    async fn attempt(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: OutputSchema,
    ) -> Result<OracleResponse, ExtractorError> {
        let oracle = Arc::clone(&self.oracle);
        let system_prompt = system_prompt.to_string();
        let user_prompt = user_prompt.to_string();

        debug!(
            schema = schema.as_str(),
            prompt_chars = system_prompt.len() + user_prompt.len(),
            "Submitting oracle call"
        );

        let task = tokio::task::spawn_blocking(move || {
            oracle
                .submit(&system_prompt, &user_prompt, schema)
                .map_err(|e| ExtractorError::Oracle(e.to_string()))
        });

        let raw = timeout(self.call_timeout, task)
            .await
            .map_err(|_| ExtractorError::Timeout(self.call_timeout.as_secs()))?
            .map_err(|e| ExtractorError::Oracle(format!("Task join error: {}", e)))??;

        debug!(response_chars = raw.len(), "Oracle responded");

        OracleResponse::decode(schema, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relex_oracle::MockOracle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick_config(max_retries: u32) -> ExtractorConfig {
        ExtractorConfig {
            max_retries,
            retry_backoff_ms: 1,
            max_backoff_ms: 4,
            ..ExtractorConfig::default()
        }
    }

    /// Sleeps on the first submit and tracks how many submits overlap
    #[derive(Default)]
    struct SlowOracle {
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Oracle for SlowOracle {
        type Error = String;

        fn submit(&self, _: &str, _: &str, _: OutputSchema) -> Result<String, String> {
            let first = self.calls.fetch_add(1, Ordering::SeqCst) == 0;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if first {
                std::thread::sleep(self.delay);
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(r#"{"entities": []}"#.to_string())
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100, 350);
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(30), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_call_decodes_response() {
        let oracle = MockOracle::new(r#"{"decisions": [{"candidate_index": 0, "keep": false}]}"#);
        let caller = OracleCaller::new(Arc::new(oracle.clone()), &quick_config(0));

        let response = caller
            .call("sys", "user", OutputSchema::Verification)
            .await
            .unwrap();
        assert_eq!(response.schema(), OutputSchema::Verification);
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let oracle = MockOracle::default();
        oracle.push_error("connection reset");
        oracle.push_response("not json");
        oracle.push_response(r#"{"entities": []}"#);

        let caller = OracleCaller::new(Arc::new(oracle.clone()), &quick_config(2));
        let response = caller.call("sys", "user", OutputSchema::EntityOnly).await;

        assert!(response.is_ok());
        assert_eq!(oracle.call_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_error() {
        let oracle = MockOracle::default();
        oracle.push_error("down");
        oracle.push_error("still down");

        let caller = OracleCaller::new(Arc::new(oracle.clone()), &quick_config(1));
        let err = caller
            .call("sys", "user", OutputSchema::Extraction)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractorError::Oracle(ref msg) if msg.contains("still down")));
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let oracle = Arc::new(SlowOracle {
            delay: Duration::from_millis(300),
            ..SlowOracle::default()
        });
        let mut caller = OracleCaller::new(Arc::clone(&oracle), &quick_config(2));
        caller.call_timeout = Duration::from_millis(50);

        let err = caller
            .call("sys", "user", OutputSchema::EntityOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Timeout(_)));

        // Let the abandoned submit finish before counting
        sleep(Duration::from_millis(400)).await;
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(oracle.max_in_flight.load(Ordering::SeqCst), 1);
    }
}
