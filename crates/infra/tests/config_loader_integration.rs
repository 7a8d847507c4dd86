//! Integration tests for the configuration loader
//!
//! Loads whole provider configurations from files on disk and feeds them to
//! the provider.

use std::io::Write;

use cxform_domain::CxError;
use cxform_infra::{config, Provider};
use tempfile::NamedTempFile;

fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write temp file");
    file
}

#[test]
fn test_load_toml_with_reconcile_overrides() {
    let file = write_config(
        ".toml",
        r#"
region = "eu-west-1"
oauth_client_id = "client-id"
oauth_client_secret = "client-secret"

[http]
timeout_secs = 10
max_attempts = 5

[reconcile]
settle_delay_ms = 250
version_retry_attempts = 4
"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).unwrap();

    assert_eq!(config.region, "eu-west-1");
    assert_eq!(config.http.timeout_secs, 10);
    assert_eq!(config.http.max_attempts, 5);
    assert_eq!(config.reconcile.settle_delay_ms, 250);
    assert_eq!(config.reconcile.version_retry_attempts, 4);
    assert_eq!(config.api_base_url().unwrap(), "https://api.mypurecloud.ie");
    assert_eq!(config.token_url().unwrap(), "https://login.mypurecloud.ie/oauth/token");
}

#[test]
fn test_loaded_json_config_builds_provider() {
    let file = write_config(
        ".json",
        r#"{
            "api_url": "http://127.0.0.1:9",
            "access_token": "token"
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).unwrap();
    let provider = Provider::new(config).unwrap();

    assert_eq!(provider.base_url(), "http://127.0.0.1:9");
    assert_eq!(provider.registry().resource_types().count(), 7);
}

#[test]
fn test_file_without_credentials_is_rejected() {
    let file = write_config(".toml", "region = \"us-east-1\"\n");

    let result = config::load_from_file(Some(file.path().to_path_buf()));

    assert!(matches!(result, Err(CxError::Config(_))));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let file = write_config(".toml", "region = [unterminated\n");

    let result = config::load_from_file(Some(file.path().to_path_buf()));

    assert!(matches!(result, Err(CxError::Config(_))));
}

#[test]
fn test_missing_file_is_config_error() {
    let result = config::load_from_file(Some("/nonexistent/cxform.toml".into()));

    assert!(matches!(result, Err(CxError::Config(_))));
}
