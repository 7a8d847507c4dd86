//! Locations

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub path: Option<Vec<String>>,
    pub emergency_number: Option<EmergencyNumber>,
    pub address: Option<LocationAddress>,
    pub state: Option<String>,
    pub version: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyNumber {
    pub number: Option<String>,
    pub e164: Option<String>,
    /// `default` or `elin`
    #[serde(rename = "type")]
    pub number_type: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddress {
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCreate {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub path: Option<Vec<String>>,
    pub emergency_number: Option<EmergencyNumber>,
    pub address: Option<LocationAddress>,
}

/// PATCH body. `notes`, `path` and `emergency_number` are always sent so that
/// removing them from configuration clears them on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub notes: String,
    pub path: Vec<String>,
    pub emergency_number: Option<EmergencyNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<LocationAddress>,
    pub version: i64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_update_sends_cleared_fields_explicitly() {
        let update = LocationUpdate { name: Some("HQ".into()), version: 4, ..Default::default() };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            json!({
                "name": "HQ",
                "notes": "",
                "path": [],
                "emergencyNumber": null,
                "version": 4
            })
        );
    }
}
