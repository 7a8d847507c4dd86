//! Integration actions and credentials

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

/// Data action bound to an integration.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationAction {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub integration_id: Option<String>,
    pub secure: Option<bool>,
    pub config: Option<ActionConfig>,
    pub contract: Option<ActionContract>,
    pub version: Option<i64>,
}

/// Input and output JSON schemas. Kept as raw JSON so keywords such as
/// `items` survive the round trip.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionContract {
    pub input: Option<ActionInput>,
    pub output: Option<ActionOutput>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionInput {
    pub input_schema: Option<Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutput {
    pub success_schema: Option<Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    pub request: Option<RequestConfig>,
    pub response: Option<ResponseConfig>,
}

/// Outbound request made by the action.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    pub request_url_template: Option<String>,
    pub request_template: Option<String>,
    pub request_type: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
}

/// Processing applied to the third-party response.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    pub translation_map: Option<BTreeMap<String, String>>,
    pub translation_map_defaults: Option<BTreeMap<String, String>>,
    pub success_template: Option<String>,
}

/// PATCH body for an existing action; `version` must be current.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActionInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub config: Option<ActionConfig>,
    pub version: Option<i64>,
}

/// Stored credential. Field values are write-only.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub credential_type: Option<CredentialType>,
    pub credential_fields: Option<BTreeMap<String, String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialType {
    pub name: Option<String>,
}
