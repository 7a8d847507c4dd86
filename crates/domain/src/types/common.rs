//! Shapes shared by every API family

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Reference to another entity by id.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEntityRef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub self_uri: Option<String>,
}

impl DomainEntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// One page of a paginated listing.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityListing<T> {
    pub entities: Option<Vec<T>>,
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub total: Option<u64>,
    pub page_count: Option<u32>,
}

impl<T> EntityListing<T> {
    /// Entities on this page; a missing list is an empty page.
    pub fn into_entities(self) -> Vec<T> {
        self.entities.unwrap_or_default()
    }
}

/// Error body returned with non-success statuses.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    pub status: Option<u16>,
}
