//! Bounded retry with a fixed delay between attempts.
//!
//! The sleep is injected so callers (and tests) control time; discovery
//! uses real `tokio::time::sleep`, tests use a recording fake.

use std::future::Future;
use std::time::Duration;

/// Retry parameters: how many attempts, how long between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // Matches the bot's startup behavior: 5 attempts, 5s apart.
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping `policy.backoff`
/// between attempts via `sleep`. Stops on the first `Ok`; returns the last
/// `Err` once attempts are exhausted.
pub async fn with_retry<T, E, Op, OpFut, Sleep, SleepFut>(
    policy: RetryPolicy,
    mut op: Op,
    sleep: Sleep,
) -> Result<T, E>
where
    Op: FnMut(u32) -> OpFut,
    OpFut: Future<Output = Result<T, E>>,
    Sleep: Fn(Duration) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => {
                last_err = Some(e);
                if attempt < attempts {
                    sleep(policy.backoff).await;
                }
            }
        }
    }

    // attempts >= 1, so last_err is always set by the time we get here
    Err(last_err.expect("at least one attempt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn first_success_stops_immediately() {
        let slept = Arc::new(Mutex::new(Vec::new()));
        let slept2 = slept.clone();

        let result: Result<u32, &str> = with_retry(
            RetryPolicy::new(5, Duration::from_secs(5)),
            |_| async { Ok(42) },
            move |d| {
                let slept = slept2.clone();
                async move {
                    slept.lock().unwrap().push(d);
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert!(slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let slept = Arc::new(Mutex::new(Vec::new()));
        let slept2 = slept.clone();

        let result: Result<u32, String> = with_retry(
            RetryPolicy::new(5, Duration::from_millis(10)),
            move |attempt| {
                let calls = calls2.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if attempt < 3 {
                        Err(format!("attempt {} failed", attempt))
                    } else {
                        Ok(attempt)
                    }
                }
            },
            move |d| {
                let slept = slept2.clone();
                async move {
                    slept.lock().unwrap().push(d);
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two failures, two sleeps, fixed delay
        assert_eq!(
            *slept.lock().unwrap(),
            vec![Duration::from_millis(10), Duration::from_millis(10)]
        );
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error() {
        let result: Result<(), String> = with_retry(
            RetryPolicy::new(3, Duration::from_millis(1)),
            |attempt| async move { Err(format!("boom {}", attempt)) },
            |_| async {},
        )
        .await;

        assert_eq!(result.unwrap_err(), "boom 3");
    }

    #[tokio::test]
    async fn zero_attempts_clamped_to_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result: Result<(), &str> = with_retry(
            RetryPolicy::new(0, Duration::ZERO),
            move |_| {
                let calls = calls2.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("nope")
                }
            },
            |_| async {},
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
