//! Locations
//!
//! Updates PATCH with the entity's current version. An emergency number
//! cannot be changed together with the address, so both are sent as
//! declared and the server decides.

use std::sync::Arc;

use async_trait::async_trait;
use cxform_common::OneOfValidator;
use cxform_core::diff::phone_numbers_equivalent;
use cxform_core::reconcile::{
    collect_pages, confirm_deleted, read_entity, settle, update_with_version_retry,
};
use cxform_core::{
    AttrValue, Attribute, Attributes, ExportedResources, OpContext, ResourceAdapter, ResourceData,
    ResourceMeta, Schema,
};
use cxform_domain::constants::{DEFAULT_PAGE_SIZE, STATE_DELETED};
use cxform_domain::{
    CxError, EmergencyNumber, EntityListing, Location, LocationAddress, LocationCreate,
    LocationUpdate, Result,
};
use tracing::info;

use super::encode_id;
use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_location";
const KIND: &str = "location";
const BASE_PATH: &str = "/api/v2/locations";

const NUMBER_TYPE_DEFAULT: &str = "default";
const NUMBER_TYPE_ELIN: &str = "elin";

pub struct LocationResource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

impl LocationResource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client, schema: schema() }
    }

    fn path(id: &str) -> String {
        format!("{BASE_PATH}/{}", encode_id(id))
    }

    async fn get_location(&self, id: &str) -> Result<Location> {
        self.client.get(&Self::path(id)).await
    }
}

fn schema() -> Schema {
    let emergency_number = Schema::new()
        .attr(
            "number",
            Attribute::string()
                .required()
                .suppress_diff(phone_numbers_equivalent)
                .describe("Emergency phone number. Compared by digits only."),
        )
        .attr(
            "type",
            Attribute::string()
                .optional()
                .default(NUMBER_TYPE_DEFAULT)
                .validate_str(OneOfValidator::new([NUMBER_TYPE_DEFAULT, NUMBER_TYPE_ELIN])),
        );

    let address = Schema::new()
        .attr("street1", Attribute::string().required())
        .attr("street2", Attribute::string().optional())
        .attr("city", Attribute::string().required())
        .attr("state", Attribute::string().optional())
        .attr("country", Attribute::string().required())
        .attr("zip_code", Attribute::string().optional());

    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("notes", Attribute::string().optional())
        .attr(
            "path",
            Attribute::string_list()
                .optional()
                .describe("Ids of the parent locations, outermost first."),
        )
        .attr("emergency_number", Attribute::block_list(emergency_number).optional().max_items(1))
        .attr("address", Attribute::block_list(address).required().max_items(1))
}

fn build_emergency_number(attrs: &Attributes) -> Result<Option<EmergencyNumber>> {
    let Some(block) = attrs.get_block("emergency_number")? else {
        return Ok(None);
    };
    Ok(Some(EmergencyNumber {
        number: block.get_string("number")?.map(str::to_string),
        number_type: Some(block.get_string("type")?.unwrap_or(NUMBER_TYPE_DEFAULT).to_string()),
        e164: None,
    }))
}

fn build_address(attrs: &Attributes) -> Result<Option<LocationAddress>> {
    let Some(block) = attrs.get_block("address")? else {
        return Ok(None);
    };
    let field = |key: &str| -> Result<Option<String>> {
        Ok(block.get_non_empty_string(key)?.map(str::to_string))
    };
    Ok(Some(LocationAddress {
        street1: field("street1")?,
        street2: field("street2")?,
        city: field("city")?,
        state: field("state")?,
        country: field("country")?,
        zipcode: field("zip_code")?,
    }))
}

fn flatten_emergency_number(data: &ResourceData, number: EmergencyNumber) -> Attributes {
    let mut block = Attributes::new();
    // Keep the declared formatting when the digits match
    let declared = data
        .attrs()
        .get_block("emergency_number")
        .ok()
        .flatten()
        .and_then(|b| b.get_string("number").ok().flatten())
        .map(str::to_string);
    let server = number.number.or(number.e164);
    let keep = matches!(
        (&declared, &server),
        (Some(declared), Some(server)) if phone_numbers_equivalent(declared, server)
    );
    block.set_opt("number", if keep { declared } else { server });
    block.set("type", number.number_type.unwrap_or_else(|| NUMBER_TYPE_DEFAULT.to_string()));
    block
}

fn flatten_address(address: LocationAddress) -> Attributes {
    let mut block = Attributes::new();
    block.set_opt("street1", address.street1);
    block.set_opt("street2", address.street2);
    block.set_opt("city", address.city);
    block.set_opt("state", address.state);
    block.set_opt("country", address.country);
    block.set_opt("zip_code", address.zipcode);
    block
}

fn apply_location(data: &mut ResourceData, location: Location) {
    data.set_opt("name", location.name);
    data.set_opt("notes", location.notes.filter(|notes| !notes.is_empty()));
    data.set_opt("path", location.path.filter(|path| !path.is_empty()));

    let emergency_number = location
        .emergency_number
        .filter(|number| number.number.is_some() || number.e164.is_some())
        .map(|number| flatten_emergency_number(data, number));
    data.set_opt("emergency_number", emergency_number.map(AttrValue::single_block));
    data.set_opt("address", location.address.map(flatten_address).map(AttrValue::single_block));
}

#[async_trait]
impl ResourceAdapter for LocationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let attrs = data.attrs();
        let name = attrs.require_string("name")?.to_string();
        info!(name = %name, "Creating {KIND}");

        let body = LocationCreate {
            name: Some(name.clone()),
            notes: attrs.get_non_empty_string("notes")?.map(str::to_string),
            path: attrs.get_string_list("path")?,
            emergency_number: build_emergency_number(attrs)?,
            address: build_address(attrs)?,
        };
        let created: Location = self.client.post(BASE_PATH, &body).await?;
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

        let Some(location) = read_entity(ctx, data, KIND, || self.get_location(&id)).await? else {
            data.clear_id();
            return Ok(());
        };

        apply_location(data, location);
        info!(id = %id, "Read {KIND}");
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        let attrs = data.attrs();
        let name = attrs.require_string("name")?.to_string();
        let notes = attrs.get_string("notes")?.unwrap_or_default().to_string();
        let path = attrs.get_string_list("path")?.unwrap_or_default();
        let emergency_number = build_emergency_number(attrs)?;
        let address = build_address(attrs)?;
        info!(id = %id, name = %name, "Updating {KIND}");

        update_with_version_retry(ctx, KIND, &id, || async {
            let current = self.get_location(&id).await?;
            let body = LocationUpdate {
                name: Some(name.clone()),
                notes: notes.clone(),
                path: path.clone(),
                emergency_number: emergency_number.clone(),
                address: address.clone(),
                version: current.version.unwrap_or_default(),
            };
            let _: Location = self.client.patch(&Self::path(&id), &body).await?;
            Ok(())
        })
        .await?;

        info!(id = %id, name = %name, "Updated {KIND}");
        settle(ctx, ctx.policy().settle_delay).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Deleting {KIND}");

        self.client.delete(&Self::path(&id)).await?;
        confirm_deleted(ctx, KIND, &id, || self.get_location(&id), |location: &Location| {
            location.state.as_deref() == Some(STATE_DELETED)
        })
        .await?;

        info!(id = %id, "Deleted {KIND}");
        Ok(())
    }

    async fn export(&self, ctx: &OpContext) -> Result<ExportedResources> {
        let locations = collect_pages(ctx, DEFAULT_PAGE_SIZE, |page| async move {
            let listing: EntityListing<Location> = self
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

        Ok(locations
            .into_iter()
            .filter(|location| location.state.as_deref() != Some(STATE_DELETED))
            .filter_map(|location| {
                Some((location.id?, ResourceMeta::new(location.name.unwrap_or_default())))
            })
            .collect())
    }
}
