// Bounded retry with exponential backoff for agent invocations
//
// Only the model call is wrapped; tool executions are never retried.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry policy for a single agent call
///
/// The wait before attempt `n + 1` is `multiplier * 2^(n - 1)` seconds,
/// clamped to `[min_wait, max_wait]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: f64,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Wait applied after the given (1-based) failed attempt
    pub fn wait_after(&self, attempt: u32) -> Duration {
        let exp = 2f64.powi(attempt.saturating_sub(1) as i32);
        let secs = (self.multiplier * exp).max(0.0);
        let wait = Duration::try_from_secs_f64(secs).unwrap_or(self.max_wait);
        wait.clamp(self.min_wait, self.max_wait)
    }

    /// Run `op` until it succeeds or the attempt budget is spent
    ///
    /// Returns the last error on exhaustion; callers decide how to degrade.
    pub async fn invoke<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => return Err(e),
                Err(e) => {
                    let wait = self.wait_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        wait_secs = wait.as_secs_f64(),
                        "Agent call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}
