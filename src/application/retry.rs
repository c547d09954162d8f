// Bounded retry with exponential backoff for rate-limited model calls
use crate::application::model_gateway::ModelError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// 1 initial attempt + 2 retries.
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 1_000;
const JITTER_MAX_MS: u64 = 1_000;

/// Invoke `operation`, retrying only rate-limit-class failures. Retries are
/// strictly sequential; before retry `i` we sleep `1s * 2^i` plus up to 1s of
/// jitter. After exhausting retries the most recent error is returned
/// unchanged so callers can branch on its classification.
pub async fn invoke_with_retry<T, F, Fut>(mut operation: F) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ModelError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_rate_limited() && attempt + 1 < MAX_ATTEMPTS => {
                let jitter = rand::thread_rng().gen_range(0..JITTER_MAX_MS);
                let delay = Duration::from_millis((BACKOFF_BASE_MS << attempt) + jitter);
                tracing::debug!(
                    "Rate limited on attempt {}, backing off {:?} before retry",
                    attempt + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retries_rate_limited_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = invoke_with_retry(move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ModelError::RateLimited("429".to_string()))
                } else {
                    Ok("layout")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "layout");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_rethrown_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), ModelError> = invoke_with_retry(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ModelError::Network("connection refused".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(ModelError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), ModelError> = invoke_with_retry(move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Err(ModelError::RateLimited(format!("429 on attempt {}", n + 1)))
            }
        })
        .await;

        match result {
            Err(ModelError::RateLimited(msg)) => assert_eq!(msg, "429 on attempt 3"),
            other => panic!("expected rate-limited error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
