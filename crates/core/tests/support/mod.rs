//! Shared test helpers for `cxform-core` integration tests.
//!
//! These helpers provide an in-memory, eventually-consistent fake so that
//! lifecycle tests can focus on behaviour instead of boilerplate.

pub mod store;
