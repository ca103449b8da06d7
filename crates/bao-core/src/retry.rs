//! Retry with linear backoff
//!
//! [`retry`] drives any fallible async attempt under a [`RetryPolicy`]. The
//! reconciler wraps the IP lookup and the record read in it; the record
//! write is never passed through here.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default number of attempts for retried operations
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default linear backoff step
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// How often to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (values below 1 act as 1)
    pub max_attempts: u32,
    /// Delay step; the wait after the n-th failed attempt is `n * base_delay`
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after `attempt` (1-based) failed
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

/// Run `attempt` until it succeeds or the policy is exhausted
///
/// The closure receives the 1-based attempt number. Every failure is logged;
/// once the last attempt fails the result is [`Error::RetriesExhausted`]
/// wrapping that attempt's error.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.attempts();
    let mut current = 1;

    loop {
        match attempt(current).await {
            Ok(value) => {
                if current > 1 {
                    debug!("{} succeeded on attempt {}", operation, current);
                }
                return Ok(value);
            }
            Err(e) => {
                warn!("{} attempt {} failed: {}", operation, current, e);

                if current >= max_attempts {
                    return Err(Error::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: current,
                        source: Box::new(e),
                    });
                }

                let delay = policy.delay_after(current);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                current += 1;
            }
        }
    }
}
