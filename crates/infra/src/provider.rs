//! Provider wiring
//!
//! Turns a [`ProviderConfig`] into an authenticated [`PlatformClient`] and a
//! [`Registry`] holding every resource adapter and data source.

use std::sync::Arc;

use cxform_core::{Lifecycle, OpContext, ReconcilePolicy, Registry};
use cxform_domain::{CxError, ProviderConfig, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{AccessTokenProvider, ClientCredentialsAuth, PlatformClient, StaticToken};
use crate::data_sources::{RoutingQueueDataSource, ScheduleGroupDataSource};
use crate::http::HttpClient;
use crate::resources::{
    ArchitectFlowResource, IdpGenericResource, IntegrationActionResource,
    IntegrationCredentialResource, LocationResource, OAuthClientResource, PhoneResource,
};

/// Configured provider
#[derive(Debug, Clone)]
pub struct Provider {
    registry: Registry,
    policy: ReconcilePolicy,
    base_url: String,
    cancel: CancellationToken,
}

impl Provider {
    /// Validate `config` and build the client and registry.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Self::with_cancel(config, CancellationToken::new())
    }

    /// Like [`Provider::new`], but cancelling `cancel` stops transport
    /// retries and every operation context handed out.
    pub fn with_cancel(config: ProviderConfig, cancel: CancellationToken) -> Result<Self> {
        config.validate()?;
        let transport = || -> Result<HttpClient> {
            Ok(HttpClient::from_settings(&config.http)?.with_cancel(cancel.clone()))
        };
        let base_url = config.api_base_url()?;

        let auth: Arc<dyn AccessTokenProvider> = match &config.access_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => {
                let (Some(client_id), Some(client_secret)) =
                    (&config.oauth_client_id, &config.oauth_client_secret)
                else {
                    return Err(CxError::Config("OAuth client credentials are missing".into()));
                };
                Arc::new(ClientCredentialsAuth::new(
                    transport()?,
                    config.token_url()?,
                    client_id.clone(),
                    client_secret.clone(),
                ))
            }
        };

        let client = Arc::new(PlatformClient::new(&base_url, transport()?, auth));
        let registry = build_registry(client)?;
        info!(
            base_url = %base_url,
            resources = registry.resource_types().count(),
            data_sources = registry.data_source_types().count(),
            "Provider configured"
        );

        let policy = ReconcilePolicy::from(&config.reconcile);
        Ok(Self { registry, policy, base_url, cancel })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn policy(&self) -> &ReconcilePolicy {
        &self.policy
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Operation context cancelled together with the provider.
    pub fn op_context(&self) -> OpContext {
        OpContext::with_cancel(self.policy.clone(), self.cancel.child_token())
    }

    /// Lifecycle driver for one resource type.
    pub fn lifecycle(&self, type_name: &str) -> Result<Lifecycle> {
        let adapter = self.registry.resource(type_name)?;
        Ok(Lifecycle::new(adapter, self.op_context()))
    }
}

fn build_registry(client: Arc<PlatformClient>) -> Result<Registry> {
    let mut registry = Registry::new();
    registry.register_resource(Arc::new(IntegrationActionResource::new(client.clone())))?;
    registry.register_resource(Arc::new(OAuthClientResource::new(client.clone())))?;
    registry.register_resource(Arc::new(IdpGenericResource::new(client.clone())))?;
    registry.register_resource(Arc::new(PhoneResource::new(client.clone())))?;
    registry.register_resource(Arc::new(LocationResource::new(client.clone())))?;
    registry.register_resource(Arc::new(IntegrationCredentialResource::new(client.clone())))?;
    registry.register_resource(Arc::new(ArchitectFlowResource::new(client.clone())))?;
    registry.register_data_source(Arc::new(RoutingQueueDataSource::new(client.clone())))?;
    registry.register_data_source(Arc::new(ScheduleGroupDataSource::new(client)))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_config() -> ProviderConfig {
        ProviderConfig {
            access_token: Some("token".into()),
            api_url: Some("http://localhost:9/".into()),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_registers_every_type() {
        let provider = Provider::new(token_config()).unwrap();
        let resources: Vec<_> = provider.registry().resource_types().collect();
        assert_eq!(
            resources,
            [
                "genesyscloud_architect_flow",
                "genesyscloud_idp_generic",
                "genesyscloud_integration_action",
                "genesyscloud_integration_credential",
                "genesyscloud_location",
                "genesyscloud_oauth_client",
                "genesyscloud_telephony_providers_edges_phone",
            ]
        );
        let sources: Vec<_> = provider.registry().data_source_types().collect();
        assert_eq!(
            sources,
            ["genesyscloud_architect_schedulegroups", "genesyscloud_routing_queue"]
        );
        assert_eq!(provider.base_url(), "http://localhost:9");
    }

    #[test]
    fn test_cancelling_the_provider_cancels_operations() {
        let cancel = CancellationToken::new();
        let provider = Provider::with_cancel(token_config(), cancel.clone()).unwrap();
        let ctx = provider.op_context();
        assert!(!ctx.is_cancelled());

        cancel.cancel();

        assert!(ctx.is_cancelled());
        assert!(provider.op_context().is_cancelled());
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        let config = ProviderConfig { access_token: None, ..token_config() };
        assert!(matches!(Provider::new(config), Err(CxError::Config(_))));
    }

    #[test]
    fn test_unknown_region_is_rejected() {
        let config =
            ProviderConfig { region: "mars-1".into(), api_url: None, ..token_config() };
        assert!(matches!(Provider::new(config), Err(CxError::Config(_))));
    }
}
