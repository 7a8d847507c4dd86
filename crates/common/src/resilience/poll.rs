//! Fixed-interval polling bounded by a deadline

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Deadline and interval for [`poll_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Total time budget measured from the first attempt.
    pub timeout: Duration,
    /// Wait between attempts.
    pub interval: Duration,
}

impl PollConfig {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    /// The expected state was observed.
    Ready(T),
    /// Not there yet; the reason is kept for the timeout report.
    Pending(String),
}

/// Errors produced by [`poll_until`]
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The deadline passed while the check was still pending
    #[error(
        "timed out after {elapsed:?}: {}",
        .last_reason.as_deref().unwrap_or("no attempt completed")
    )]
    TimedOut { elapsed: Duration, last_reason: Option<String> },

    /// The check failed with an error that is not worth retrying
    #[error("poll aborted: {0}")]
    Failed(E),

    /// The cancellation token fired
    #[error("poll cancelled")]
    Cancelled,
}

/// A cancellable wait was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wait cancelled")]
pub struct Cancelled;

/// Run `check` until it returns [`PollStep::Ready`].
///
/// The check runs immediately, then once per `interval`. The last attempt is
/// made at the deadline itself, so a check that becomes ready exactly at the
/// deadline still succeeds. Cancellation is honoured both while the check is
/// in flight and while sleeping.
pub async fn poll_until<T, E, F, Fut>(
    config: PollConfig,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStep<T>, E>>,
{
    let start = Instant::now();
    let deadline = start + config.timeout;
    let mut last_reason = None;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        let step = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PollError::Cancelled),
            step = check() => step,
        };

        match step {
            Ok(PollStep::Ready(value)) => {
                if attempt > 1 {
                    debug!(attempt, elapsed = ?start.elapsed(), "poll condition reached");
                }
                return Ok(value);
            }
            Ok(PollStep::Pending(reason)) => {
                debug!(attempt, %reason, "poll condition pending");
                last_reason = Some(reason);
            }
            Err(err) => return Err(PollError::Failed(err)),
        }

        let now = Instant::now();
        if now >= deadline {
            let elapsed = now - start;
            warn!(attempt, ?elapsed, "poll deadline exceeded");
            return Err(PollError::TimedOut { elapsed, last_reason });
        }

        let wait = config.interval.min(deadline - now);
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PollError::Cancelled),
            () = sleep(wait) => {}
        }
    }
}

/// Sleep for `delay` unless cancelled first.
pub async fn settle(delay: Duration, cancel: &CancellationToken) -> Result<(), Cancelled> {
    if delay.is_zero() {
        return Ok(());
    }
    debug!(?delay, "waiting for changes to settle");
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Cancelled),
        () = sleep(delay) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn config(timeout_secs: u64) -> PollConfig {
        PollConfig::new(Duration::from_secs(timeout_secs), Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_when_check_becomes_ready() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let cancel = CancellationToken::new();

        let result: Result<u32, PollError<()>> = poll_until(config(30), &cancel, || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Ok(PollStep::Pending(format!("attempt {n}")))
                } else {
                    Ok(PollStep::Ready(n))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_last_reason() {
        let cancel = CancellationToken::new();
        let start = Instant::now();

        let result: Result<(), PollError<()>> = poll_until(config(5), &cancel, || async {
            Ok(PollStep::Pending("still exists".to_string()))
        })
        .await;

        match result {
            Err(PollError::TimedOut { elapsed, last_reason }) => {
                assert_eq!(elapsed, Duration::from_secs(5));
                assert_eq!(last_reason.as_deref(), Some("still exists"));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_error_aborts_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let cancel = CancellationToken::new();

        let result: Result<(), PollError<&str>> = poll_until(config(30), &cancel, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("forbidden") }
        })
        .await;

        assert!(matches!(result, Err(PollError::Failed("forbidden"))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_the_wait() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(2500)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result: Result<(), PollError<()>> = poll_until(config(30), &cancel, || async {
            Ok(PollStep::Pending("not yet".to_string()))
        })
        .await;

        assert!(matches!(result, Err(PollError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_full_delay() {
        let cancel = CancellationToken::new();
        let start = Instant::now();
        settle(Duration::from_secs(5), &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_returns_early_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(settle(Duration::from_secs(20), &cancel).await, Err(Cancelled));
    }
}
