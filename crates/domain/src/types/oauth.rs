//! OAuth clients and authorization divisions

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// OAuth client as returned by the API; also used as the create/update body.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClient {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub access_token_validity_seconds: Option<i64>,
    pub authorized_grant_type: Option<String>,
    pub state: Option<String>,
    pub registered_redirect_uri: Option<Vec<String>>,
    pub scope: Option<Vec<String>>,
    pub role_divisions: Option<Vec<RoleDivision>>,
}

/// A role granted within a division.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDivision {
    pub role_id: Option<String>,
    pub division_id: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: Option<String>,
    pub name: Option<String>,
    pub home_division: Option<bool>,
}
