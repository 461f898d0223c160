//! Configuration, rate limiting and retry for the storyboard pipeline.
//!
//! - [`StoryboardConfig`] loads layered TOML configuration
//! - [`RateLimiter`] keeps provider calls inside request quotas
//! - [`RetryPolicy`] retries transient failures with exponential backoff

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod retry;

pub use config::{EstimateSettings, FrameSettings, GeminiSettings, RetrySettings, StoryboardConfig};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use retry::RetryPolicy;
