//! Bounded retry with a fixed delay
//!
//! Re-runs an operation while a [`RetryPolicy`] classifies its error as
//! transient, up to a fixed number of attempts. Used for optimistic
//! concurrency where each attempt re-reads the current version.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    #[error("All retry attempts exhausted after {attempts} tries")]
    AttemptsExhausted { attempts: u32, last: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error")]
    NonRetryable { error: E },

    /// The cancellation token fired between attempts
    #[error("Retry cancelled after {attempts} tries")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    /// The underlying operation error, if one was recorded.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { last, .. } => Some(last),
            Self::NonRetryable { error } => Some(error),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a custom
    /// delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Run `operation` up to `max_attempts` times, sleeping `delay` between
/// attempts that `policy` allows to be retried.
pub async fn retry_with_policy<T, E, P, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    policy: &P,
    cancel: &CancellationToken,
    mut operation: F,
) -> RetryResult<T, E>
where
    P: RetryPolicy<E>,
    E: fmt::Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        debug!("Executing operation (attempt {}/{})", attempt, max_attempts);

        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Operation succeeded after {} retries", attempt - 1);
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        let wait = match policy.should_retry(&error, attempt) {
            RetryDecision::Stop => {
                debug!("Retry policy determined not to retry: {:?}", error);
                return Err(RetryError::NonRetryable { error });
            }
            RetryDecision::Retry => delay,
            RetryDecision::RetryAfter(custom) => custom,
        };

        if attempt >= max_attempts {
            warn!("All retry attempts exhausted after {} tries, last error: {:?}", attempt, error);
            return Err(RetryError::AttemptsExhausted { attempts: attempt, last: error });
        }

        warn!("Operation failed (attempt {}), retrying after {:?}", attempt, wait);
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt }),
            () = tokio::time::sleep(wait) => {}
        }
    }
}

/// Retry while `predicate` holds for the error.
pub async fn retry_when<T, E, R, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    retryable: R,
    cancel: &CancellationToken,
    operation: F,
) -> RetryResult<T, E>
where
    R: Fn(&E) -> bool,
    E: fmt::Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let policy = policies::PredicateRetry::new(move |error: &E, _attempt: u32| retryable(error));
    retry_with_policy(max_attempts, delay, &policy, cancel, operation).await
}

/// Common retry policies
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Predicate-based retry policy
    #[derive(Debug)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
