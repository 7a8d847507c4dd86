//! Waiting primitives for eventually-consistent remote state
//!
//! This module provides **generic, reusable** building blocks:
//! - **Polling**: re-run a check at a fixed interval until it reports ready,
//!   a deadline passes, or the caller cancels
//! - **Retry**: re-run an operation a bounded number of times while a policy
//!   classifies its error as transient
//! - **Settle**: a fixed, cancellable wait for effects the server does not
//!   expose a signal for
//!
//! None of these use backoff or jitter. Intervals are fixed so that deadlines
//! are predictable.

pub mod poll;
pub mod retry;

pub use poll::{poll_until, settle, Cancelled, PollConfig, PollError, PollStep};
pub use retry::{
    policies, retry_when, retry_with_policy, RetryDecision, RetryError, RetryPolicy, RetryResult,
};
