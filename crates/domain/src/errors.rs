//! Error types used throughout cxform

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for cxform
///
/// Transient classes (`NotFound` inside a confirmation window,
/// `VersionConflict`) are retried locally by the reconcile helpers; every
/// other variant propagates to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CxError {
    /// The server reports that the entity does not exist (HTTP 404 or 410).
    #[error("Not found: {0}")]
    NotFound(String),

    /// An update was rejected because the supplied version was stale.
    #[error("Version conflict: {0}")]
    VersionConflict(String),

    /// A bounded wait elapsed without reaching the expected state.
    #[error("Retry exhausted after {elapsed_ms}ms: {message}")]
    RetryExhausted { elapsed_ms: u64, message: String },

    /// Any other non-success response, with the server message preserved.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A typed accessor found a value of a different type.
    #[error("Type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch { key: String, expected: String, found: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CxError {
    /// Build a `RetryExhausted` error from a measured wait.
    pub fn retry_exhausted(elapsed: Duration, message: impl Into<String>) -> Self {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        Self::RetryExhausted { elapsed_ms, message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict(_))
    }

    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Result type alias for cxform operations
pub type Result<T> = std::result::Result<T, CxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_exhausted_records_elapsed_millis() {
        let err = CxError::retry_exhausted(Duration::from_secs(30), "phone p1 still exists");
        assert_eq!(
            err,
            CxError::RetryExhausted { elapsed_ms: 30_000, message: "phone p1 still exists".into() }
        );
        assert!(err.is_retry_exhausted());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let err = CxError::NotFound("action a1".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "NotFound");
        assert_eq!(json["message"], "action a1");
    }

    #[test]
    fn test_api_error_display_keeps_server_message() {
        let err = CxError::Api { status: 400, message: "name is required".into() };
        assert_eq!(err.to_string(), "API error (HTTP 400): name is required");
    }
}
