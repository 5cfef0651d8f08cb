// libs/shared/store/src/retry.rs
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Bounded exponential backoff applied strictly at the persistence boundary.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 50)
    }
}

/// Run `op` until it succeeds, fails permanently, or the attempt budget is
/// spent. The whole operation re-runs each attempt; callers must not cache
/// results (such as a conflict check) across attempts.
pub async fn with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    op_name: &str,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && attempt < policy.attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Transient failure in {} (attempt {}/{}), retrying in {:?}",
                    op_name, attempt, policy.attempts, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
