// Retry policy for transient API failures.
// A predicate, a retry budget, and a fixed backoff, applied to fetch outcomes.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DEFAULT_RETRY_BACKOFF;
use crate::error::Result;

use super::types::{FetchFailure, FetchResult};

/// Decides which failures are retried, how often, and how long to wait.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Fixed wait before each retry.
    pub backoff: Duration,
    is_transient: fn(&FetchFailure) -> bool,
}

impl Default for RetryPolicy {
    /// Retry a rate-limited request once after two seconds.
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: DEFAULT_RETRY_BACKOFF,
            is_transient: FetchFailure::is_rate_limited,
        }
    }
}

impl RetryPolicy {
    /// Default rate-limit policy with a custom backoff.
    pub fn rate_limit(backoff: Duration) -> Self {
        Self {
            backoff,
            ..Default::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_predicate(mut self, is_transient: fn(&FetchFailure) -> bool) -> Self {
        self.is_transient = is_transient;
        self
    }

    /// Whether a failure on the given (0-indexed) attempt should be retried.
    pub fn should_retry(&self, failure: &FetchFailure, attempt: u32) -> bool {
        attempt < self.max_retries && (self.is_transient)(failure)
    }

    /// Run `operation`, retrying transient failures within budget.
    ///
    /// The outcome of the last attempt is returned as-is. Errors from the
    /// operation itself are never retried.
    pub async fn run<F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<FetchResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<FetchResult>>,
    {
        let mut attempt = 0;

        loop {
            let result = operation().await?;

            if let FetchResult::Failure(failure) = &result {
                if self.should_retry(failure, attempt) {
                    warn!(
                        "{}: attempt {} rate limited, retrying in {:?}",
                        operation_name,
                        attempt + 1,
                        self.backoff
                    );
                    sleep(self.backoff).await;
                    attempt += 1;
                    continue;
                }

                if attempt > 0 {
                    warn!(
                        "{}: giving up after {} attempts: HTTP {}",
                        operation_name,
                        attempt + 1,
                        failure.status
                    );
                } else {
                    debug!("{}: not retrying HTTP {}", operation_name, failure.status);
                }
            }

            return Ok(result);
        }
    }
}
