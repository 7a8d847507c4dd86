//! Generic SAML identity provider

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Singleton SSO configuration. The API takes a single certificate in
/// `certificate` and several in `certificates`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericSaml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub certificate: Option<String>,
    pub certificates: Option<Vec<String>>,
    #[serde(rename = "issuerURI")]
    pub issuer_uri: Option<String>,
    #[serde(rename = "ssoTargetURI")]
    pub sso_target_uri: Option<String>,
    pub relying_party_identifier: Option<String>,
    pub disabled: Option<bool>,
    pub logo_image_data: Option<String>,
    pub endpoint_compression: Option<bool>,
    pub name_identifier_format: Option<String>,
}
