//! Retry policy timing tests on paused Tokio time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use storyboard_error::{
    GeminiError, GeminiErrorKind, SchemaError, StoryboardError, StoryboardErrorKind,
    StoryboardResult,
};
use storyboard_rate_limit::RetryPolicy;
use tokio::time::Instant;

fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(120))
}

fn unavailable() -> GeminiError {
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 503,
        message: "Service unavailable".to_string(),
    })
}

#[tokio::test(start_paused = true)]
async fn fail_twice_then_succeed_waits_one_then_two_seconds() {
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let result: StoryboardResult<&str> = policy()
        .run("test", |_| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StoryboardError::from(unavailable()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(3), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3100), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn permanent_error_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));

    let result: StoryboardResult<()> = policy()
        .run("test", |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoryboardError::from(SchemaError::new("script", "not an array")))
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err.kind(), StoryboardErrorKind::Schema(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_attempts_return_last_error() {
    let calls = Arc::new(AtomicU32::new(0));

    let result: StoryboardResult<()> = policy()
        .run("test", |attempt| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoryboardError::from(GeminiError::new(GeminiErrorKind::ApiRequest(
                    format!("attempt {}", attempt),
                ))))
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("attempt 3"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn hung_call_times_out_and_is_retried() {
    let policy = RetryPolicy::new(2, Duration::from_secs(1), Duration::from_secs(120));
    let start = Instant::now();

    let result: StoryboardResult<u32> = policy
        .run("test", |attempt| async move {
            if attempt == 1 {
                tokio::time::sleep(Duration::from_secs(600)).await;
            }
            Ok::<u32, StoryboardError>(attempt)
        })
        .await;

    assert_eq!(result.unwrap(), 2);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(121), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(122), "elapsed {:?}", elapsed);
}

#[test]
fn backoff_doubles_and_fallback_follows_last_retry() {
    let policy = policy();
    assert_eq!(policy.backoff(1), Duration::from_secs(1));
    assert_eq!(policy.backoff(2), Duration::from_secs(2));
    assert_eq!(policy.backoff(3), Duration::from_secs(4));
    assert_eq!(policy.fallback_delay(), Duration::from_secs(4));
    assert_eq!(policy.delays().count(), 2);
}
