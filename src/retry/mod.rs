//! Page retry wrapper
//!
//! Runs one fallible async operation up to a bounded number of attempts with
//! exponential backoff between them. Every failure is retried the same way;
//! the retryable classification from the HTTP layer only shows up in logs.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Bounded exponential-backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for every further attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a new policy
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Attempts actually made; a zero budget still makes one attempt
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after `failed_attempts` consecutive failures (1-based).
    ///
    /// `base * 2^(failed_attempts - 1)`: with a one second base that is
    /// 1s, 2s, 4s, ... No jitter and no cap.
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1);
        let factor = 2u32.saturating_pow(exponent);
        self.base_delay.saturating_mul(factor)
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `label` names the operation in log lines (e.g. `products page 3`). On
/// exhaustion the result is `Error::RetriesExhausted` carrying the attempt
/// count and the last error.
pub async fn fetch_with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("Successfully fetched {} on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) => {
                warn!(
                    retryable = e.is_retryable(),
                    "Attempt {}/{} failed for {}: {}",
                    attempt,
                    max_attempts,
                    label,
                    e
                );

                if attempt >= max_attempts {
                    return Err(Error::RetriesExhausted {
                        attempts: max_attempts,
                        source: Box::new(e),
                    });
                }

                let delay = policy.backoff(attempt);
                info!(
                    "Waiting {:?} before retry {} for {}",
                    delay,
                    attempt + 1,
                    label
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
