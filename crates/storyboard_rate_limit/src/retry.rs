//! Composable retry policy with exponential backoff and per-call timeouts.

use crate::RetrySettings;
use std::future::Future;
use std::time::Duration;
use storyboard_error::{
    PipelineError, PipelineErrorKind, RetryableError, StoryboardError, StoryboardResult,
};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Retry schedule applied uniformly to story-world and frame generation.
///
/// The delay before retry *k* (k ≥ 1) is `base_delay × 2^(k-1)`, so three
/// attempts with a one-second base wait 1 s and then 2 s. A caller-driven
/// fallback attempt after the last retry waits [`RetryPolicy::fallback_delay`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyboard_rate_limit::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(120));
/// let delays: Vec<_> = policy.delays().collect();
/// assert_eq!(delays, vec![Duration::from_secs(1), Duration::from_secs(2)]);
/// assert_eq!(policy.fallback_delay(), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    call_timeout: Duration,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    pub fn new(max_attempts: u32, base_delay: Duration, call_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            call_timeout,
        }
    }

    /// Create a policy from configuration.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            settings.base_delay(),
            settings.call_timeout(),
        )
    }

    /// Attempts made by [`RetryPolicy::run`], including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound for a single call.
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Delay before retry `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Delays between consecutive attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let policy = *self;
        (1..policy.max_attempts).map(move |retry| policy.backoff(retry))
    }

    /// Delay before a fallback attempt made after all retries failed.
    pub fn fallback_delay(&self) -> Duration {
        self.backoff(self.max_attempts)
    }

    /// Run one call under the per-call timeout.
    ///
    /// An elapsed timeout is reported as a retryable
    /// [`PipelineErrorKind::Timeout`].
    pub async fn attempt<T, Fut>(&self, call: Fut) -> StoryboardResult<T>
    where
        Fut: Future<Output = StoryboardResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::new(PipelineErrorKind::Timeout(
                self.call_timeout.as_secs(),
            ))
            .into()),
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. Errors are classified with
    /// [`RetryableError`]; a permanent error is returned without further
    /// attempts. After the last attempt the last error is returned.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> StoryboardResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = StoryboardResult<T>>,
    {
        let max_attempts = self.max_attempts;
        let mut attempt = 0u32;

        Retry::spawn(self.delays(), || {
            attempt += 1;
            let current = attempt;
            let call = op(current);
            async move {
                debug!(label, attempt = current, max_attempts, "Starting attempt");
                match self.attempt(call).await {
                    Ok(value) => Ok(value),
                    Err(e) => classify(label, current, max_attempts, e),
                }
            }
        })
        .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

fn classify<T>(
    label: &str,
    attempt: u32,
    max_attempts: u32,
    err: StoryboardError,
) -> Result<T, RetryError<StoryboardError>> {
    if err.is_retryable() {
        warn!(label, attempt, max_attempts, error = %err, "Transient error");
        Err(RetryError::Transient {
            err,
            retry_after: None,
        })
    } else {
        warn!(label, attempt, error = %err, "Permanent error, failing immediately");
        Err(RetryError::Permanent(err))
    }
}
