//! Exponential backoff with jitter, shared by every HTTP call this crate makes.
//!
//! Base `1s`, factor `2.0`, `+-25%` jitter, at most `max_attempts` tries.
//! `IngestError::Fatal` never retries; `IngestError::Transient` always does
//! until attempts are exhausted, at which point it is returned as-is.

use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use backoff::future::retry;
use rand::Rng;

use crate::errors::{IngestError, IngestResult};

pub async fn with_retry<F, Fut, T>(max_attempts: u32, op: F) -> IngestResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = IngestResult<T>>,
{
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_secs(1))
        .with_multiplier(2.0)
        .with_randomization_factor(0.25)
        .with_max_elapsed_time(None)
        .build();

    let mut attempts = 0u32;
    retry(backoff, || {
        attempts += 1;
        let fut = op();
        async move {
            match fut.await {
                Ok(v) => Ok(v),
                Err(e @ IngestError::Fatal(_)) => Err(backoff::Error::permanent(e)),
                Err(e) if attempts >= max_attempts => Err(backoff::Error::permanent(e)),
                Err(e) => {
                    // Add a small extra jitter sleep beyond what the backoff
                    // policy schedules, so concurrent callers hitting the
                    // same rate limit don't retry in lockstep.
                    let extra_ms = rand::thread_rng().gen_range(0..250);
                    tokio::time::sleep(Duration::from_millis(extra_ms)).await;
                    Err(backoff::Error::transient(e))
                }
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn fatal_errors_never_retry() {
        let calls = AtomicU32::new(0);
        let result: IngestResult<()> = with_retry(5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(IngestError::Fatal("nope".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_errors_retry_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(5, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(IngestError::Transient("busy".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn transient_errors_stop_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: IngestResult<()> = with_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(IngestError::Transient("busy".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
