//! Bounded retry for transient content API failures

use std::future::Future;
use std::time::Duration;

use super::error::CmsError;

/// Retry policy with exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op`, retrying transient errors
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, CmsError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CmsError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay(attempt);
                    tracing::warn!(
                        "{} failed ({}), retrying in {}ms",
                        what,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
