//! # cxform Domain
//!
//! Domain types shared by every cxform crate.
//!
//! This crate contains:
//! - The error taxonomy and `Result` alias
//! - Provider configuration (credentials, region, tunable reconcile delays)
//! - Wire types for the contact-center REST API
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other cxform crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
