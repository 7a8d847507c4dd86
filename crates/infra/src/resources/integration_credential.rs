//! Integration credentials
//!
//! Field values are write-only: reads never return them, so state keeps
//! whatever was last declared.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use cxform_core::reconcile::{collect_pages, confirm_deleted, read_entity, settle};
use cxform_core::{
    Attribute, Attributes, ExportedResources, OpContext, ResourceAdapter, ResourceData,
    ResourceMeta, Schema,
};
use cxform_domain::constants::DEFAULT_PAGE_SIZE;
use cxform_domain::{Credential, CredentialType, CxError, EntityListing, Result};
use tracing::info;

use super::encode_id;
use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_integration_credential";
const KIND: &str = "credential";
const BASE_PATH: &str = "/api/v2/integrations/credentials";

pub struct IntegrationCredentialResource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

impl IntegrationCredentialResource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client, schema: schema() }
    }

    fn path(id: &str) -> String {
        format!("{BASE_PATH}/{}", encode_id(id))
    }

    async fn get_credential(&self, id: &str) -> Result<Credential> {
        self.client.get(&Self::path(id)).await
    }
}

fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().optional().describe("Credential name."))
        .attr(
            "credential_type_name",
            Attribute::string()
                .required()
                .describe("Credential type name, see /api/v2/integrations/credentials/types."),
        )
        .attr(
            "fields",
            Attribute::string_map()
                .optional()
                .computed()
                .sensitive()
                .describe("Credential fields. Required fields depend on the credential type."),
        )
}

fn build_credential(attrs: &Attributes) -> Result<Credential> {
    let fields: BTreeMap<String, String> =
        attrs.get_string_map("fields")?.cloned().unwrap_or_default();
    Ok(Credential {
        id: None,
        name: attrs.get_string("name")?.map(str::to_string),
        credential_type: Some(CredentialType {
            name: Some(attrs.require_string("credential_type_name")?.to_string()),
        }),
        credential_fields: Some(fields),
    })
}

#[async_trait]
impl ResourceAdapter for IntegrationCredentialResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let body = build_credential(data.attrs())?;
        let name = body.name.clone().unwrap_or_default();
        info!(name = %name, "Creating {KIND}");

        let created: Credential = self.client.post(BASE_PATH, &body).await?;
        let id = created
            .id
            .ok_or_else(|| CxError::Internal(format!("created {KIND} {name} has no id")))?;
        data.set_id(&id);

        info!(id = %id, name = %name, "Created {KIND}");
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Reading {KIND}");

        let fetched = read_entity(ctx, data, KIND, || self.get_credential(&id)).await?;
        let Some(credential) = fetched else {
            data.clear_id();
            return Ok(());
        };

        data.set_opt("name", credential.name);
        data.set_opt("credential_type_name", credential.credential_type.and_then(|t| t.name));
        info!(id = %id, "Read {KIND}");
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();

        if data.has_changes(&["name", "credential_type_name", "fields"]) {
            info!(id = %id, "Updating {KIND}");
            let body = build_credential(data.attrs())?;
            let _: Credential = self.client.put(&Self::path(&id), &body).await?;
            info!(id = %id, "Updated {KIND}");
        }

        settle(ctx, ctx.policy().settle_delay).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Deleting {KIND}");

        self.client.delete(&Self::path(&id)).await?;
        confirm_deleted(ctx, KIND, &id, || self.get_credential(&id), |_: &Credential| false)
            .await?;

        info!(id = %id, "Deleted {KIND}");
        Ok(())
    }

    async fn export(&self, ctx: &OpContext) -> Result<ExportedResources> {
        let credentials = collect_pages(ctx, DEFAULT_PAGE_SIZE, |page| async move {
            let listing: EntityListing<Credential> = self
                .client
                .get_with_query(
                    BASE_PATH,
                    &[
                        ("pageSize", DEFAULT_PAGE_SIZE.to_string()),
                        ("pageNumber", page.to_string()),
                    ],
                )
                .await?;
            Ok(listing.into_entities())
        })
        .await?;

        // Credentials may be nameless
        Ok(credentials
            .into_iter()
            .filter_map(|credential| Some((credential.id?, ResourceMeta::new(credential.name?))))
            .collect())
    }
}
