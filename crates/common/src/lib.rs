//! Generic utilities shared across cxform crates.
//!
//! Nothing in this crate knows about the contact-center API; the reconcile
//! policy in `cxform-core` is assembled from these pieces.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: field validators
//! - `runtime`: deadline polling, bounded retry and cancellable settle delays

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod validation;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use resilience::{
    poll_until, retry_when, retry_with_policy, settle, Cancelled, PollConfig, PollError, PollStep,
    RetryDecision, RetryError, RetryPolicy, RetryResult,
};
#[cfg(feature = "foundation")]
pub use validation::{FieldValidator, OneOfValidator, RangeValidator, StringValidator};
