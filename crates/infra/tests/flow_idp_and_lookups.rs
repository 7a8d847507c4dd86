//! Architect flow, generic IdP and data source lookups against a mocked API
//!
//! **Coverage:**
//! - Flow import: register job, upload to the presigned URL, poll to success
//! - Flow import failure surfaces the job messages
//! - IdP create is a PUT of the singleton; export is empty on 404
//! - Queue lookup succeeds once search indexing catches up
//! - Schedule group lookup gives up after the search timeout

#[path = "support.rs"]
mod support;

use std::io::Write;

use cxform_core::{Attributes, DataSource, ResourceAdapter, ResourceData};
use cxform_domain::CxError;
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn flow_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "inboundCall:\n  name: Main IVR\n  defaultLanguage: en-us").unwrap();
    file
}

async fn mount_job_registration(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v2/flows/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "presignedUrl": format!("{}/upload/job-1", server.uri()),
            "headers": {"x-upload-token": "abc"}
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/job-1"))
        .and(header("x-upload-token", "abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_flow_create_imports_file_and_waits_for_job() {
    let server = MockServer::start().await;
    mount_job_registration(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/flows/jobs/job-1"))
        .and(query_param("expand", "messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "status": "Started"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/flows/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "status": "Success",
            "flow": {"id": "flow-1"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/flows/flow-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "flow-1",
            "name": "Main IVR",
            "type": "INBOUNDCALL"
        })))
        .mount(&server)
        .await;

    let file = flow_file();
    let filepath = file.path().to_string_lossy().to_string();
    let lifecycle = support::lifecycle(&server, "genesyscloud_architect_flow");
    let state = lifecycle.apply(None, Attributes::new().with("filepath", filepath)).await.unwrap();

    assert_eq!(state.id, "flow-1");
    assert_eq!(state.attributes.get_string("name").unwrap(), Some("Main IVR"));
    assert_eq!(state.attributes.get_string("type").unwrap(), Some("INBOUNDCALL"));
    let hash = state.attributes.get_string("file_content_hash").unwrap().unwrap();
    assert_eq!(hash.len(), 64);
}

#[tokio::test]
async fn test_flow_import_failure_reports_messages() {
    let server = MockServer::start().await;
    mount_job_registration(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/flows/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "status": "Failure",
            "messages": [{"text": "Unknown flow type"}]
        })))
        .mount(&server)
        .await;

    let file = flow_file();
    let filepath = file.path().to_string_lossy().to_string();
    let lifecycle = support::lifecycle(&server, "genesyscloud_architect_flow");
    let config = Attributes::new().with("filepath", filepath);
    let err = lifecycle.apply(None, config).await.unwrap_err();

    assert!(err.to_string().contains("Unknown flow type"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_idp_create_puts_singleton() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/identityproviders/generic"))
        .and(body_partial_json(json!({
            "name": "Okta",
            "certificate": "MIIC-cert",
            "nameIdentifierFormat": "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "generic"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/identityproviders/generic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "generic",
            "name": "Okta",
            "certificate": "MIIC-cert",
            "issuerURI": "https://idp.example.com",
            "disabled": false
        })))
        .mount(&server)
        .await;

    let config = Attributes::new()
        .with("name", "Okta")
        .with("certificates", cxform_core::AttrValue::string_set(["MIIC-cert"]))
        .with("issuer_uri", "https://idp.example.com");
    let lifecycle = support::lifecycle(&server, "genesyscloud_idp_generic");
    let state = lifecycle.apply(None, config).await.unwrap();

    assert_eq!(state.id, "generic");
    assert_eq!(
        state.attributes.get_string_list("certificates").unwrap(),
        Some(vec!["MIIC-cert".to_string()])
    );
}

#[tokio::test]
async fn test_idp_export_is_empty_when_unconfigured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/identityproviders/generic"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let provider = support::provider(&server);
    let adapter = provider.registry().resource("genesyscloud_idp_generic").unwrap();
    let exported = adapter.export(&provider.op_context()).await.unwrap();

    assert!(exported.is_empty());
}

#[tokio::test]
async fn test_queue_lookup_waits_for_search_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/routing/queues"))
        .and(query_param("pageNumber", "1"))
        .and(query_param("name", "Support"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [{"id": "q2", "name": "Support Tier 2"}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/routing/queues"))
        .and(query_param("pageNumber", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entities": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/routing/queues"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [{"id": "q2", "name": "Support Tier 2"}, {"id": "q1", "name": "Support"}]
        })))
        .mount(&server)
        .await;

    let provider = support::provider(&server);
    let source = provider.registry().data_source("genesyscloud_routing_queue").unwrap();
    let mut data = ResourceData::from_config(Attributes::new().with("name", "Support"));
    source.read(&provider.op_context(), &mut data).await.unwrap();

    assert_eq!(data.id(), Some("q1"));
}

#[tokio::test]
async fn test_schedule_group_lookup_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/architect/schedulegroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entities": []})))
        .mount(&server)
        .await;

    let provider = support::provider(&server);
    let source = provider.registry().data_source("genesyscloud_architect_schedulegroups").unwrap();
    let mut data = ResourceData::from_config(Attributes::new().with("name", "Holidays"));
    let err = source.read(&provider.op_context(), &mut data).await;

    assert!(matches!(err, Err(CxError::RetryExhausted { .. })));
    assert_eq!(data.id(), None);
}
