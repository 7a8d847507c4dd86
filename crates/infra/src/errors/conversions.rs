//! Conversions from external infrastructure errors into domain errors.

use cxform_domain::{ApiErrorBody, CxError};
use reqwest::Error as HttpError;
use reqwest::StatusCode;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CxError);

impl From<InfraError> for CxError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CxError> for InfraError {
    fn from(value: CxError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCxError {
    fn into_cx(self) -> CxError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CxError */
/* -------------------------------------------------------------------------- */

impl IntoCxError for HttpError {
    fn into_cx(self) -> CxError {
        if self.is_timeout() {
            return CxError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return CxError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return CxError::Internal(format!("Failed to decode response: {self}"));
        }

        if let Some(status) = self.status() {
            let message =
                status.canonical_reason().unwrap_or("unknown status").to_string();
            return status_error(status, &message);
        }

        CxError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_cx())
    }
}

/* -------------------------------------------------------------------------- */
/* Non-success responses → CxError */
/* -------------------------------------------------------------------------- */

/// Server message from an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { message: Some(message), .. }) if !message.is_empty() => message,
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().to_string(),
    }
}

/// Phrases the platform uses when a write carries a stale `version`.
const VERSION_MISMATCH_PHRASES: [&str; 3] = [
    "does not match the current version",
    "does not match current version",
    "version mismatch",
];

fn mentions_version_mismatch(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    VERSION_MISMATCH_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Classify a non-success status with the server's message preserved.
pub fn status_error(status: StatusCode, message: &str) -> CxError {
    let code = status.as_u16();
    let message = message.to_string();
    match code {
        404 | 410 => CxError::NotFound(message),
        409 => CxError::VersionConflict(message),
        400 if mentions_version_mismatch(&message) => CxError::VersionConflict(message),
        401 | 403 => CxError::Auth(format!("HTTP {code}: {message}")),
        _ => CxError::Api { status: code, message },
    }
}

/// Classify a response body returned with a non-success status.
pub fn response_error(status: StatusCode, body: &str) -> CxError {
    status_error(status, &error_message(body))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_not_found_and_gone_map_to_not_found() {
        assert!(response_error(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(response_error(StatusCode::GONE, "").is_not_found());
    }

    #[test]
    fn test_conflict_and_version_400_map_to_version_conflict() {
        assert!(response_error(StatusCode::CONFLICT, "{}").is_version_conflict());
        let body =
            r#"{"message":"Version 4 does not match current version 5","code":"bad.request"}"#;
        assert!(response_error(StatusCode::BAD_REQUEST, body).is_version_conflict());
    }

    #[test]
    fn test_unrelated_400_mentioning_version_is_not_a_conflict() {
        for message in [
            "Field 'version' must match pattern ^[0-9]+$",
            "Contract schema version does not match the request template",
            "Request body does not match the schema for version 2",
        ] {
            let body = serde_json::json!({"message": message, "code": "bad.request"}).to_string();
            let err = response_error(StatusCode::BAD_REQUEST, &body);
            assert!(!err.is_version_conflict(), "{message} classified as {err:?}");
            assert!(matches!(err, CxError::Api { status: 400, .. }));
        }
        assert!(response_error(StatusCode::BAD_REQUEST, r#"{"message":"Version mismatch"}"#)
            .is_version_conflict());
    }

    #[test]
    fn test_other_statuses_keep_server_message() {
        let body = r#"{"message":"Category is required","code":"bad.request","status":400}"#;
        assert_eq!(
            response_error(StatusCode::BAD_REQUEST, body),
            CxError::Api { status: 400, message: "Category is required".into() }
        );
        assert_eq!(
            response_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded"),
            CxError::Api { status: 500, message: "upstream exploded".into() }
        );
    }

    #[test]
    fn test_forbidden_maps_to_auth() {
        let err = response_error(StatusCode::FORBIDDEN, r#"{"message":"missing permission"}"#);
        assert!(matches!(err, CxError::Auth(msg) if msg.contains("missing permission")));
    }

    #[tokio::test]
    async fn test_http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: CxError = InfraError::from(error).into();
        match mapped {
            CxError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }
}
