//! Edge phones
//!
//! A phone with `line_addresses` is standalone: each address becomes its own
//! line. WebRTC phones get their user assigned to the phone's station, which
//! only shows up in station search some time after the phone is created.

use std::sync::Arc;

use async_trait::async_trait;
use cxform_common::{FieldValidator, OneOfValidator};
use cxform_core::reconcile::{
    collect_pages, confirm_deleted, read_entity, search_until_found, settle,
};
use cxform_core::{
    AttrValue, Attribute, Attributes, ExportedResources, OpContext, RefAttr, ResourceAdapter,
    ResourceData, ResourceMeta, Schema,
};
use cxform_domain::constants::{DEFAULT_PAGE_SIZE, STATE_ACTIVE, STATE_DELETED, STATE_INACTIVE};
use cxform_domain::{
    CxError, DomainEntityRef, EntityListing, Line, Phone, PhoneBaseSettings, PhoneCapabilities,
    Result, Station,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::info;

use super::encode_id;
use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_telephony_providers_edges_phone";
const KIND: &str = "phone";
const BASE_PATH: &str = "/api/v2/telephony/providers/edges/phones";
const BASE_SETTINGS_PATH: &str = "/api/v2/telephony/providers/edges/phonebasesettings";
const STATIONS_PATH: &str = "/api/v2/stations";

const MEDIA_CODECS: [&str; 5] =
    ["audio/opus", "audio/pcmu", "audio/pcma", "audio/g729", "audio/g722"];

const REFERENCES: &[RefAttr] = &[
    RefAttr::new("web_rtc_user_id", "genesyscloud_user"),
    RefAttr::new("site_id", "genesyscloud_telephony_providers_edges_site"),
    RefAttr::new(
        "phone_base_settings_id",
        "genesyscloud_telephony_providers_edges_phonebasesettings",
    ),
];

static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{1,14}$").expect("E164_REGEX should compile - this is a bug")
});

/// Phone numbers in E.164 form, e.g. `+13175550100`.
#[derive(Debug, Clone, Copy, Default)]
pub struct E164Validator;

impl FieldValidator<str> for E164Validator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        if E164_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(format!("Value must be an E.164 phone number: {value}"))
        }
    }
}

pub struct PhoneResource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

impl PhoneResource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client, schema: schema() }
    }

    fn path(id: &str) -> String {
        format!("{BASE_PATH}/{}", encode_id(id))
    }

    async fn get_phone(&self, id: &str) -> Result<Phone> {
        self.client.get(&Self::path(id)).await
    }

    async fn phone_meta_base_id(&self, base_settings_id: &str) -> Result<String> {
        let settings: PhoneBaseSettings = self
            .client
            .get(&format!("{BASE_SETTINGS_PATH}/{}", encode_id(base_settings_id)))
            .await?;
        settings.phone_meta_base.and_then(|meta| meta.id).ok_or_else(|| {
            CxError::Internal(format!("phone base settings {base_settings_id} have no meta base"))
        })
    }

    async fn find_station(&self, user_id: &str) -> Result<Option<String>> {
        let listing: EntityListing<Station> = self
            .client
            .get_with_query(
                STATIONS_PATH,
                &[
                    ("pageSize", DEFAULT_PAGE_SIZE.to_string()),
                    ("pageNumber", "1".to_string()),
                    ("webRtcUserId", user_id.to_string()),
                ],
            )
            .await?;
        Ok(listing.into_entities().into_iter().find_map(|station| station.id))
    }

    /// Make the phone's station the user's default station.
    async fn assign_web_rtc_user(&self, ctx: &OpContext, user_id: &str) -> Result<()> {
        let what = format!("station for WebRTC user {user_id}");
        let station_id = search_until_found(ctx, &what, || self.find_station(user_id)).await?;
        self.client
            .put_empty(&format!(
                "/api/v2/users/{}/station/defaultstation/{}",
                encode_id(user_id),
                encode_id(&station_id)
            ))
            .await?;
        info!(user_id, station_id = %station_id, "Assigned WebRTC user to station");
        Ok(())
    }

    async fn build_phone(&self, attrs: &Attributes) -> Result<Phone> {
        let base_settings_id = attrs.require_string("phone_base_settings_id")?;
        let line_base_settings =
            DomainEntityRef::new(attrs.require_string("line_base_settings_id")?);
        let addresses = attrs.get_string_list("line_addresses")?.unwrap_or_default();
        let standalone = !addresses.is_empty();

        Ok(Phone {
            name: Some(attrs.require_string("name")?.to_string()),
            state: Some(attrs.get_string("state")?.unwrap_or(STATE_ACTIVE).to_string()),
            site: Some(DomainEntityRef::new(attrs.require_string("site_id")?)),
            phone_base_settings: Some(DomainEntityRef::new(base_settings_id)),
            phone_meta_base: Some(DomainEntityRef::new(
                self.phone_meta_base_id(base_settings_id).await?,
            )),
            lines: Some(build_lines(&line_base_settings, &addresses)),
            line_base_settings: Some(line_base_settings),
            web_rtc_user: attrs.get_non_empty_string("web_rtc_user_id")?.map(DomainEntityRef::new),
            capabilities: build_capabilities(attrs)?,
            properties: standalone.then(standalone_properties),
            ..Phone::default()
        })
    }
}

fn schema() -> Schema {
    let capabilities = Schema::new()
        .attr("provisions", Attribute::bool().optional())
        .attr("registers", Attribute::bool().optional())
        .attr("dual_registers", Attribute::bool().optional())
        .attr("hardware_id_type", Attribute::string().optional())
        .attr("allow_reboot", Attribute::bool().optional())
        .attr("no_rebalance", Attribute::bool().optional())
        .attr("no_cloud_provisioning", Attribute::bool().optional())
        .attr(
            "media_codecs",
            Attribute::string_list().optional().validate_str(OneOfValidator::new(MEDIA_CODECS)),
        )
        .attr("cdm", Attribute::bool().optional());

    Schema::new()
        .attr("name", Attribute::string().required())
        .attr(
            "state",
            Attribute::string().optional().default(STATE_ACTIVE).validate_str(OneOfValidator::new(
                [STATE_ACTIVE, STATE_INACTIVE, STATE_DELETED],
            )),
        )
        .attr("site_id", Attribute::string().required())
        .attr("phone_base_settings_id", Attribute::string().required())
        .attr("line_base_settings_id", Attribute::string().required())
        .attr("phone_meta_base_id", Attribute::string().computed())
        .attr(
            "web_rtc_user_id",
            Attribute::string()
                .optional()
                .describe("User assigned to a WebRTC phone after it is created."),
        )
        .attr(
            "line_addresses",
            Attribute::string_list()
                .optional()
                .computed()
                .validate_str(E164Validator)
                .describe("Ordered list of line DIDs for standalone phones."),
        )
        .attr(
            "capabilities",
            Attribute::block_list(capabilities).optional().computed().max_items(1),
        )
}

fn build_lines(line_base_settings: &DomainEntityRef, addresses: &[String]) -> Vec<Line> {
    let base_id = line_base_settings.id().unwrap_or_default();
    if addresses.is_empty() {
        return vec![Line {
            name: Some(format!("line_{base_id}")),
            line_base_settings: Some(line_base_settings.clone()),
            ..Line::default()
        }];
    }

    addresses
        .iter()
        .enumerate()
        .map(|(index, address)| {
            let properties = json!({
                "station_identity_address": {"value": {"instance": address}}
            });
            Line {
                name: Some(format!("line_{base_id}_{}", index + 1)),
                line_base_settings: Some(line_base_settings.clone()),
                properties: properties.as_object().cloned(),
                ..Line::default()
            }
        })
        .collect()
}

fn standalone_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("phone_standalone".into(), json!({"value": {"instance": true}}));
    properties
}

fn build_capabilities(attrs: &Attributes) -> Result<Option<PhoneCapabilities>> {
    let Some(block) = attrs.get_block("capabilities")? else {
        return Ok(None);
    };
    let flag = |key: &str| -> Result<Option<bool>> {
        Ok(Some(block.get_bool(key)?.unwrap_or(false)))
    };
    let hardware_id_type = block.get_string("hardware_id_type")?.unwrap_or_default();

    Ok(Some(PhoneCapabilities {
        provisions: flag("provisions")?,
        registers: flag("registers")?,
        dual_registers: flag("dual_registers")?,
        hardware_id_type: Some(hardware_id_type.to_string()),
        allow_reboot: flag("allow_reboot")?,
        no_rebalance: flag("no_rebalance")?,
        no_cloud_provisioning: flag("no_cloud_provisioning")?,
        media_codecs: Some(block.get_string_list("media_codecs")?.unwrap_or_default()),
        cdm: flag("cdm")?,
    }))
}

fn flatten_capabilities(capabilities: PhoneCapabilities) -> Attributes {
    let mut block = Attributes::new();
    block.set_opt("provisions", capabilities.provisions);
    block.set_opt("registers", capabilities.registers);
    block.set_opt("dual_registers", capabilities.dual_registers);
    block.set_opt("hardware_id_type", capabilities.hardware_id_type.filter(|h| !h.is_empty()));
    block.set_opt("allow_reboot", capabilities.allow_reboot);
    block.set_opt("no_rebalance", capabilities.no_rebalance);
    block.set_opt("no_cloud_provisioning", capabilities.no_cloud_provisioning);
    block.set_opt("media_codecs", capabilities.media_codecs);
    block.set_opt("cdm", capabilities.cdm);
    block
}

fn apply_phone(data: &mut ResourceData, phone: Phone) {
    let ref_id = |entity: Option<DomainEntityRef>| entity.and_then(|e| e.id);

    data.set_opt("name", phone.name);
    data.set_opt("state", phone.state);
    data.set_opt("site_id", ref_id(phone.site));
    data.set_opt("phone_base_settings_id", ref_id(phone.phone_base_settings));
    data.set_opt("line_base_settings_id", ref_id(phone.line_base_settings));
    data.set_opt("phone_meta_base_id", ref_id(phone.phone_meta_base));
    data.set_opt("web_rtc_user_id", ref_id(phone.web_rtc_user));
    if let Some(lines) = phone.lines {
        let addresses: Vec<String> = lines
            .iter()
            .filter_map(Line::station_identity_address)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect();
        data.set("line_addresses", AttrValue::string_list(addresses));
    }
    if let Some(capabilities) = phone.capabilities {
        data.set("capabilities", AttrValue::single_block(flatten_capabilities(capabilities)));
    }
}

#[async_trait]
impl ResourceAdapter for PhoneResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let body = self.build_phone(data.attrs()).await?;
        let name = body.name.clone().unwrap_or_default();
        info!(name = %name, "Creating {KIND}");

        let created: Phone = self.client.post(BASE_PATH, &body).await?;
        let id = created
            .id
            .ok_or_else(|| CxError::Internal(format!("created {KIND} {name} has no id")))?;
        data.set_id(&id);

        if let Some(user_id) = data.attrs().get_non_empty_string("web_rtc_user_id")? {
            let user_id = user_id.to_string();
            self.assign_web_rtc_user(ctx, &user_id).await?;
        }

        info!(id = %id, name = %name, "Created {KIND}");
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Reading {KIND}");

        let Some(phone) = read_entity(ctx, data, KIND, || self.get_phone(&id)).await? else {
            data.clear_id();
            return Ok(());
        };

        apply_phone(data, phone);
        info!(id = %id, "Read {KIND}");
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Updating {KIND}");

        let body = self.build_phone(data.attrs()).await?;
        let _: Phone = self.client.put(&Self::path(&id), &body).await?;

        if data.has_change("web_rtc_user_id") {
            if let Some(user_id) = data.attrs().get_non_empty_string("web_rtc_user_id")? {
                let user_id = user_id.to_string();
                self.assign_web_rtc_user(ctx, &user_id).await?;
            }
        }

        info!(id = %id, "Updated {KIND}");
        settle(ctx, ctx.policy().settle_delay).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Deleting {KIND}");

        self.client.delete(&Self::path(&id)).await?;
        confirm_deleted(ctx, KIND, &id, || self.get_phone(&id), |phone: &Phone| {
            phone.state.as_deref() == Some(STATE_DELETED)
        })
        .await?;

        info!(id = %id, "Deleted {KIND}");
        Ok(())
    }

    async fn export(&self, ctx: &OpContext) -> Result<ExportedResources> {
        let phones = collect_pages(ctx, DEFAULT_PAGE_SIZE, |page| async move {
            let listing: EntityListing<Phone> = self
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

        Ok(phones
            .into_iter()
            .filter(|phone| phone.state.as_deref() != Some(STATE_DELETED))
            .filter_map(|phone| {
                Some((phone.id?, ResourceMeta::new(phone.name.unwrap_or_default())))
            })
            .collect())
    }

    fn references(&self) -> &'static [RefAttr] {
        REFERENCES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_e164_accepts_international_numbers_only() {
        assert!(E164Validator.validate("+13175550100").is_ok());
        assert!(E164Validator.validate("3175550100").is_err());
        assert!(E164Validator.validate("+0123").is_err());
    }

    #[test]
    fn test_standalone_lines_carry_their_address() {
        let lbs = DomainEntityRef::new("lbs-1");
        let lines = build_lines(&lbs, &["+13175550100".into(), "+13175550101".into()]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].name.as_deref(), Some("line_lbs-1_2"));
        assert_eq!(lines[1].station_identity_address(), Some("+13175550101"));
    }

    #[test]
    fn test_phone_without_addresses_gets_one_plain_line() {
        let lines = build_lines(&DomainEntityRef::new("lbs-1"), &[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name.as_deref(), Some("line_lbs-1"));
        assert!(lines[0].properties.is_none());
    }
}
