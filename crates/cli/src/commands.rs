//! Subcommand handlers. Results go to the given writer, logs to stderr.

use std::io::Write;

use anyhow::{bail, Result};
use cxform_core::{Attributes, RefreshOutcome, ResourceData};
use cxform_infra::Provider;
use serde_json::json;

pub fn types(provider: &Provider, out: &mut impl Write) -> Result<()> {
    let registry = provider.registry();
    writeln!(out, "resources:")?;
    for name in registry.resource_types() {
        writeln!(out, "  {name}")?;
    }
    writeln!(out, "data sources:")?;
    for name in registry.data_source_types() {
        writeln!(out, "  {name}")?;
    }
    Ok(())
}

pub async fn export(provider: &Provider, type_name: &str, out: &mut impl Write) -> Result<()> {
    let adapter = provider.registry().resource(type_name)?;
    let exported = adapter.export(&provider.op_context()).await?;
    tracing::info!(type_name, count = exported.len(), "Exported entities");

    for (id, meta) in exported {
        writeln!(out, "{id}\t{}", meta.name)?;
    }
    Ok(())
}

pub async fn read(
    provider: &Provider,
    type_name: &str,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let adapter = provider.registry().resource(type_name)?;
    let lifecycle = provider.lifecycle(type_name)?;

    match lifecycle.import(id).await? {
        RefreshOutcome::Present(state) => {
            let rendered = json!({
                "type": type_name,
                "id": state.id,
                "attributes": adapter.schema().encode(&state.attributes, true),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&rendered)?)?;
        }
        RefreshOutcome::Gone => bail!("{type_name} {id} not found"),
    }
    Ok(())
}

pub async fn lookup(
    provider: &Provider,
    data_source: &str,
    name: &str,
    out: &mut impl Write,
) -> Result<()> {
    let source = provider.registry().data_source(data_source)?;
    let config = Attributes::new().with("name", name);
    source.schema().validate(&config)?;

    let mut data = ResourceData::from_config(config);
    source.read(&provider.op_context(), &mut data).await?;
    match data.id() {
        Some(id) => writeln!(out, "{id}")?,
        None => bail!("{data_source} has no match for {name}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cxform_domain::{HttpSettings, ProviderConfig, ReconcileSettings};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(server: &MockServer) -> Provider {
        let config = ProviderConfig {
            api_url: Some(server.uri()),
            access_token: Some("test-token".into()),
            http: HttpSettings { timeout_secs: 5, max_attempts: 1, base_backoff_ms: 1 },
            reconcile: ReconcileSettings {
                read_timeout_ms: 200,
                search_timeout_ms: 200,
                poll_interval_ms: 20,
                settle_delay_ms: 0,
                ..ReconcileSettings::default()
            },
            ..ProviderConfig::default()
        };
        Provider::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_types_lists_both_kinds() {
        let server = MockServer::start().await;
        let mut out = Vec::new();

        types(&provider(&server), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("resources:\n"));
        assert!(text.contains("  genesyscloud_oauth_client\n"));
        assert!(text.contains("data sources:\n  genesyscloud_architect_schedulegroups\n"));
    }

    #[tokio::test]
    async fn test_lookup_prints_matched_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/architect/schedulegroups"))
            .and(query_param("name", "Holidays"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entities": [{"id": "sg-1", "name": "Holidays"}]
            })))
            .mount(&server)
            .await;
        let mut out = Vec::new();

        lookup(&provider(&server), "genesyscloud_architect_schedulegroups", "Holidays", &mut out)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "sg-1\n");
    }

    #[tokio::test]
    async fn test_read_of_missing_entity_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/locations/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let mut out = Vec::new();

        let err =
            read(&provider(&server), "genesyscloud_location", "gone", &mut out).await.unwrap_err();

        assert!(err.to_string().contains("not found"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let server = MockServer::start().await;
        let mut out = Vec::new();

        let result = export(&provider(&server), "genesyscloud_nope", &mut out).await;

        assert!(result.is_err());
    }
}
