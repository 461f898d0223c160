//! Request rate limiter using governor and Tokio Semaphore.
//!
//! - Governor (GCRA) enforces requests per minute
//! - A Tokio Semaphore enforces the number of requests in flight

use crate::GeminiSettings;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter shared by every call a provider client makes.
///
/// Cloning is cheap and clones share the same quota.
///
/// # Example
///
/// ```
/// use storyboard_rate_limit::RateLimiter;
///
/// # async fn demo() {
/// let limiter = RateLimiter::new(60, 2);
/// let guard = limiter.acquire().await;
/// // Make API call...
/// drop(guard); // Releases concurrent slot
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl RateLimiter {
    /// Create a limiter for `rpm` requests per minute and `max_concurrent`
    /// requests in flight.
    ///
    /// An `rpm` of zero disables the per-minute quota. At least one request
    /// is always allowed in flight.
    pub fn new(rpm: u32, max_concurrent: u32) -> Self {
        let rpm_limiter =
            NonZeroU32::new(rpm).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));
        let max_concurrent = max_concurrent.max(1) as usize;

        Self {
            rpm_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Create a limiter from the provider settings.
    pub fn from_settings(settings: &GeminiSettings) -> Self {
        Self::new(settings.rpm, settings.max_concurrent)
    }

    /// Maximum number of requests in flight.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Requests that could start right now without waiting for a slot.
    pub fn available_slots(&self) -> usize {
        self.concurrent_semaphore.available_permits()
    }

    /// Wait until a request may start.
    ///
    /// Returns a guard that releases the concurrent slot when dropped.
    pub async fn acquire(&self) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        // Last, to avoid holding a slot while waiting for quota.
        // The semaphore is never closed, so a permit is always granted.
        let permit = self.concurrent_semaphore.clone().acquire_owned().await.ok();
        trace!(available = self.available_slots(), "Rate limit slot acquired");

        RateLimiterGuard { _permit: permit }
    }

    /// Try to acquire without waiting.
    ///
    /// Returns None if the quota or the concurrency limit would block.
    pub fn try_acquire(&self) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;
        Some(RateLimiterGuard {
            _permit: Some(permit),
        })
    }
}

/// RAII guard for the rate limiter.
///
/// Releases the concurrent request slot when dropped.
#[derive(Debug)]
pub struct RateLimiterGuard {
    _permit: Option<OwnedSemaphorePermit>,
}
