//! Phones, lines and stations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use super::common::DomainEntityRef;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub site: Option<DomainEntityRef>,
    pub phone_base_settings: Option<DomainEntityRef>,
    pub line_base_settings: Option<DomainEntityRef>,
    pub phone_meta_base: Option<DomainEntityRef>,
    pub lines: Option<Vec<Line>>,
    pub web_rtc_user: Option<DomainEntityRef>,
    pub capabilities: Option<PhoneCapabilities>,
    pub properties: Option<Map<String, Value>>,
}

/// A line on a phone. Standalone lines carry their DID in
/// `properties.station_identity_address.value.instance`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: Option<String>,
    pub name: Option<String>,
    pub line_base_settings: Option<DomainEntityRef>,
    pub properties: Option<Map<String, Value>>,
}

impl Line {
    /// Address of a standalone line, if one is set.
    pub fn station_identity_address(&self) -> Option<&str> {
        self.properties
            .as_ref()?
            .get("station_identity_address")?
            .get("value")?
            .get("instance")?
            .as_str()
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCapabilities {
    pub provisions: Option<bool>,
    pub registers: Option<bool>,
    pub dual_registers: Option<bool>,
    pub hardware_id_type: Option<String>,
    pub allow_reboot: Option<bool>,
    pub no_rebalance: Option<bool>,
    pub no_cloud_provisioning: Option<bool>,
    pub media_codecs: Option<Vec<String>>,
    pub cdm: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneBaseSettings {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone_meta_base: Option<DomainEntityRef>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: Option<String>,
    pub name: Option<String>,
}
