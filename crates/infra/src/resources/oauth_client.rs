//! OAuth clients
//!
//! A client must be made inactive before the server accepts its deletion.
//! Role grants without a division default to the organisation's home
//! division, which is looked up once and cached.

use std::sync::Arc;

use async_trait::async_trait;
use cxform_common::{OneOfValidator, PollStep, RangeValidator};
use cxform_core::reconcile::{confirm_deleted, poll, read_entity, settle};
use cxform_core::{
    AttrValue, Attribute, Attributes, ExportedResources, OpContext, RefAttr, RemoveIfMissing,
    ResourceAdapter, ResourceData, ResourceMeta, Schema,
};
use cxform_domain::constants::{STATE_ACTIVE, STATE_DELETED, STATE_DISABLED, STATE_INACTIVE};
use cxform_domain::{CxError, Division, EntityListing, OAuthClient, Result, RoleDivision};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::encode_id;
use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_oauth_client";
const KIND: &str = "oauth client";
const BASE_PATH: &str = "/api/v2/oauth/clients";
const HOME_DIVISION_PATH: &str = "/api/v2/authorization/divisions/home";

const GRANT_TYPES: [&str; 5] = ["CODE", "TOKEN", "SAML2BEARER", "PASSWORD", "CLIENT-CREDENTIALS"];

const REFERENCES: &[RefAttr] = &[
    RefAttr::new("roles.role_id", "genesyscloud_auth_role"),
    // `*` grants the role in every division
    RefAttr::new("roles.division_id", "genesyscloud_auth_division").with_alt_values(&["*"]),
];

const REMOVE_IF_MISSING: &[RemoveIfMissing] =
    &[RemoveIfMissing { block: "roles", fields: &["role_id"] }];

pub struct OAuthClientResource {
    client: Arc<PlatformClient>,
    schema: Schema,
    home_division: OnceCell<String>,
}

impl OAuthClientResource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client, schema: schema(), home_division: OnceCell::new() }
    }

    fn path(id: &str) -> String {
        format!("{BASE_PATH}/{}", encode_id(id))
    }

    async fn get_client(&self, id: &str) -> Result<OAuthClient> {
        self.client.get(&Self::path(id)).await
    }

    async fn home_division_id(&self) -> Result<&str> {
        let id = self
            .home_division
            .get_or_try_init(|| async {
                let division: Division = self.client.get(HOME_DIVISION_PATH).await?;
                debug!(division = ?division.id, "Resolved home division");
                division
                    .id
                    .ok_or_else(|| CxError::Internal("home division has no id".to_string()))
            })
            .await?;
        Ok(id.as_str())
    }

    async fn build_roles(&self, attrs: &Attributes) -> Result<Option<Vec<RoleDivision>>> {
        let Some(blocks) = attrs.get_blocks("roles")? else {
            return Ok(None);
        };
        let mut roles = Vec::with_capacity(blocks.len());
        for block in blocks {
            let role_id = block.require_string("role_id")?.to_string();
            let division_id = match block.get_non_empty_string("division_id")? {
                Some(division) => division.to_string(),
                None => self.home_division_id().await?.to_string(),
            };
            roles.push(RoleDivision { role_id: Some(role_id), division_id: Some(division_id) });
        }
        Ok(Some(roles))
    }

    async fn build_request(&self, attrs: &Attributes) -> Result<OAuthClient> {
        Ok(OAuthClient {
            name: Some(attrs.require_string("name")?.to_string()),
            description: Some(attrs.get_string("description")?.unwrap_or_default().to_string()),
            access_token_validity_seconds: attrs.get_int("access_token_validity_seconds")?,
            authorized_grant_type: attrs
                .get_string("authorized_grant_type")?
                .map(str::to_string),
            state: Some(attrs.get_string("state")?.unwrap_or(STATE_ACTIVE).to_string()),
            registered_redirect_uri: attrs.get_string_list("registered_redirect_uris")?,
            scope: attrs.get_string_list("scopes")?,
            role_divisions: self.build_roles(attrs).await?,
            ..OAuthClient::default()
        })
    }

    async fn put_client(&self, id: &str, attrs: &Attributes) -> Result<()> {
        let body = self.build_request(attrs).await?;
        let _: OAuthClient = self.client.put(&Self::path(id), &body).await?;
        Ok(())
    }
}

fn schema() -> Schema {
    let role = Schema::new()
        .attr(
            "role_id",
            Attribute::string()
                .required()
                .describe("Role to be associated with the given division which forms a grant."),
        )
        .attr(
            "division_id",
            Attribute::string()
                .optional()
                .computed()
                .describe("Division of the grant. The home division is used when unset."),
        );

    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr(
            "access_token_validity_seconds",
            Attribute::int()
                .optional()
                .default(86_400i64)
                .validate_int(RangeValidator::new(300i64, 172_800i64)),
        )
        .attr("registered_redirect_uris", Attribute::string_set().optional())
        .attr(
            "authorized_grant_type",
            Attribute::string().required().validate_str(OneOfValidator::new(GRANT_TYPES)),
        )
        .attr("scopes", Attribute::string_set().optional())
        .attr("roles", Attribute::block_set(role).optional())
        .attr(
            "state",
            Attribute::string()
                .optional()
                .default(STATE_ACTIVE)
                .validate_str(OneOfValidator::new([STATE_ACTIVE, STATE_INACTIVE])),
        )
}

fn flatten_roles(roles: &[RoleDivision]) -> AttrValue {
    let mut roles = roles.to_vec();
    roles.sort();
    AttrValue::blocks(roles.into_iter().map(|role| {
        let mut block = Attributes::new();
        block.set_opt("role_id", role.role_id);
        block.set_opt("division_id", role.division_id);
        block
    }))
}

fn apply_client(data: &mut ResourceData, client: OAuthClient) {
    data.set_opt("name", client.name);
    data.set_opt("description", client.description.filter(|d| !d.is_empty()));
    data.set_opt("access_token_validity_seconds", client.access_token_validity_seconds);
    data.set_opt("authorized_grant_type", client.authorized_grant_type);
    data.set_opt("state", client.state);
    data.set_opt(
        "registered_redirect_uris",
        client.registered_redirect_uri.map(AttrValue::string_set),
    );
    data.set_opt("scopes", client.scope.map(AttrValue::string_set));
    data.set_opt("roles", client.role_divisions.as_deref().map(flatten_roles));
}

#[async_trait]
impl ResourceAdapter for OAuthClientResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let body = self.build_request(data.attrs()).await?;
        let name = body.name.clone().unwrap_or_default();
        info!(name = %name, "Creating {KIND}");

        let created: OAuthClient = self.client.post(BASE_PATH, &body).await?;
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

        let Some(client) = read_entity(ctx, data, KIND, || self.get_client(&id)).await? else {
            data.clear_id();
            return Ok(());
        };

        apply_client(data, client);
        info!(id = %id, "Read {KIND}");
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Updating {KIND}");

        self.put_client(&id, data.attrs()).await?;

        info!(id = %id, "Updated {KIND}");
        settle(ctx, ctx.policy().settle_delay).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Deleting {KIND}");

        // Active clients cannot be deleted
        let mut inactive = data.attrs().clone();
        inactive.set("state", STATE_INACTIVE);
        self.put_client(&id, &inactive).await?;
        settle(ctx, ctx.policy().settle_delay).await?;

        let what = format!("{KIND} {id} did not become inactive");
        poll(ctx, ctx.policy().read_timeout, &what, || async {
            let client = self.get_client(&id).await?;
            Ok(match client.state.as_deref() {
                Some(STATE_INACTIVE) => PollStep::Ready(()),
                state => PollStep::Pending(format!("state is {}", state.unwrap_or("unknown"))),
            })
        })
        .await?;
        data.set("state", STATE_INACTIVE);

        self.client.delete(&Self::path(&id)).await?;
        confirm_deleted(ctx, KIND, &id, || self.get_client(&id), |client: &OAuthClient| {
            client.state.as_deref() == Some(STATE_DELETED)
        })
        .await?;

        info!(id = %id, "Deleted {KIND}");
        Ok(())
    }

    async fn export(&self, _ctx: &OpContext) -> Result<ExportedResources> {
        // The listing endpoint is not paged
        let listing: EntityListing<OAuthClient> = self.client.get(BASE_PATH).await?;

        Ok(listing
            .into_entities()
            .into_iter()
            .filter(|client| client.state.as_deref() != Some(STATE_DISABLED))
            .filter_map(|client| {
                Some((client.id?, ResourceMeta::new(client.name.unwrap_or_default())))
            })
            .collect())
    }

    fn references(&self) -> &'static [RefAttr] {
        REFERENCES
    }

    fn remove_if_missing(&self) -> &'static [RemoveIfMissing] {
        REMOVE_IF_MISSING
    }
}
