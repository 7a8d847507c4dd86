//! Generic SAML identity provider
//!
//! A singleton: there is at most one per organisation, always addressed by
//! the fixed id `generic`. Create is an update.

use std::sync::Arc;

use async_trait::async_trait;
use cxform_common::OneOfValidator;
use cxform_core::reconcile::{confirm_deleted, read_entity, settle};
use cxform_core::{
    AttrValue, Attribute, ExportedResources, OpContext, ResourceAdapter, ResourceData,
    ResourceMeta, Schema,
};
use cxform_domain::constants::GENERIC_IDP_ID;
use cxform_domain::{CxError, GenericSaml, Result};
use tracing::info;

use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_idp_generic";
const KIND: &str = "generic identity provider";
const PATH: &str = "/api/v2/identityproviders/generic";

const NAME_ID_UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified";
const NAME_ID_FORMATS: [&str; 8] = [
    NAME_ID_UNSPECIFIED,
    "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress",
    "urn:oasis:names:tc:SAML:1.1:nameid-format:X509SubjectName",
    "urn:oasis:names:tc:SAML:1.1:nameid-format:WindowsDomainQualifiedName",
    "urn:oasis:names:tc:SAML:2.0:nameid-format:kerberos",
    "urn:oasis:names:tc:SAML:2.0:nameid-format:entity",
    "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent",
    "urn:oasis:names:tc:SAML:2.0:nameid-format:transient",
];

pub struct IdpGenericResource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

impl IdpGenericResource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client, schema: schema() }
    }

    async fn get_generic(&self) -> Result<GenericSaml> {
        self.client.get(PATH).await
    }
}

fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required().describe("Name of the provider."))
        .attr(
            "certificates",
            Attribute::string_set()
                .required()
                .describe("PEM or DER encoded public X.509 certificates for SAML signatures."),
        )
        .attr("issuer_uri", Attribute::string().required())
        .attr("target_uri", Attribute::string().optional())
        .attr("relying_party_identifier", Attribute::string().optional())
        .attr("disabled", Attribute::bool().optional().default(false))
        .attr(
            "logo_image_data",
            Attribute::string().optional().describe("Base64 encoded SVG image."),
        )
        .attr("endpoint_compression", Attribute::bool().optional().default(false))
        .attr(
            "name_identifier_format",
            Attribute::string()
                .optional()
                .default(NAME_ID_UNSPECIFIED)
                .validate_str(OneOfValidator::new(NAME_ID_FORMATS)),
        )
}

fn build_request(data: &ResourceData) -> Result<GenericSaml> {
    let attrs = data.attrs();
    let text = |key: &str| -> Result<Option<String>> {
        Ok(Some(attrs.get_string(key)?.unwrap_or_default().to_string()))
    };

    let mut request = GenericSaml {
        name: text("name")?,
        issuer_uri: text("issuer_uri")?,
        sso_target_uri: text("target_uri")?,
        relying_party_identifier: text("relying_party_identifier")?,
        disabled: Some(attrs.get_bool("disabled")?.unwrap_or(false)),
        logo_image_data: text("logo_image_data")?,
        endpoint_compression: Some(attrs.get_bool("endpoint_compression")?.unwrap_or(false)),
        name_identifier_format: text("name_identifier_format")?,
        ..GenericSaml::default()
    };

    // A lone certificate goes in `certificate`, several in `certificates`
    match attrs.get_string_list("certificates")? {
        Some(mut certificates) if certificates.len() == 1 => {
            request.certificate = certificates.pop();
        }
        Some(certificates) => request.certificates = Some(certificates),
        None => {}
    }
    Ok(request)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn apply_generic(data: &mut ResourceData, generic: GenericSaml) {
    let certificates = match (generic.certificate, generic.certificates) {
        (Some(certificate), _) => Some(vec![certificate]),
        (None, certificates) => certificates,
    };
    data.set_opt("name", generic.name);
    data.set_opt("certificates", certificates.map(AttrValue::string_set));
    data.set_opt("issuer_uri", generic.issuer_uri);
    data.set_opt("target_uri", non_empty(generic.sso_target_uri));
    data.set_opt("relying_party_identifier", non_empty(generic.relying_party_identifier));
    data.set_opt("disabled", generic.disabled);
    data.set_opt("logo_image_data", non_empty(generic.logo_image_data));
    data.set_opt("endpoint_compression", generic.endpoint_compression);
    data.set_opt("name_identifier_format", generic.name_identifier_format);
}

#[async_trait]
impl ResourceAdapter for IdpGenericResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        info!("Creating {KIND}");
        data.set_id(GENERIC_IDP_ID);
        self.update(ctx, data).await
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        info!("Reading {KIND}");

        let Some(generic) = read_entity(ctx, data, KIND, || self.get_generic()).await? else {
            data.clear_id();
            return Ok(());
        };

        apply_generic(data, generic);
        info!("Read {KIND}");
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        info!("Updating {KIND}");

        let body = build_request(data)?;
        let _: GenericSaml = self.client.put(PATH, &body).await?;

        info!("Updated {KIND}");
        // Identity provider changes take a long time to reach API caches
        settle(ctx, ctx.policy().idp_settle_delay).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, _data: &mut ResourceData) -> Result<()> {
        info!("Deleting {KIND}");

        self.client.delete(PATH).await?;
        confirm_deleted(ctx, KIND, GENERIC_IDP_ID, || self.get_generic(), |_: &GenericSaml| false)
            .await?;

        info!("Deleted {KIND}");
        Ok(())
    }

    async fn export(&self, _ctx: &OpContext) -> Result<ExportedResources> {
        let mut resources = ExportedResources::new();
        match self.get_generic().await {
            Ok(_) => {
                resources.insert(GENERIC_IDP_ID.to_string(), ResourceMeta::new(GENERIC_IDP_ID));
            }
            // Nothing configured, nothing to export
            Err(CxError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }
        Ok(resources)
    }
}
