//! Error conversions at the infrastructure boundary

pub mod conversions;

pub use conversions::{error_message, response_error, status_error, InfraError};
