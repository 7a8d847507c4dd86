//! Architect flows, import jobs and schedule groups

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::DomainEntityRef;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub flow_type: Option<String>,
    /// Flows owned by the platform itself.
    pub system: Option<bool>,
    pub locked_user: Option<DomainEntityRef>,
}

/// Response to registering an import job: where to upload the flow file.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterArchitectJob {
    pub id: Option<String>,
    pub presigned_url: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
}

/// Import job progress.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectJobStatus {
    pub id: Option<String>,
    /// `Started`, `Success` or `Failure`
    pub status: Option<String>,
    pub flow: Option<DomainEntityRef>,
    pub messages: Option<Vec<JobMessage>>,
}

impl ArchitectJobStatus {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("Success")
    }

    pub fn is_failure(&self) -> bool {
        self.status.as_deref() == Some("Failure")
    }

    /// Messages joined for error reporting.
    pub fn message_text(&self) -> String {
        self.messages
            .iter()
            .flatten()
            .filter_map(|m| m.text.as_deref())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMessage {
    pub text: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGroup {
    pub id: Option<String>,
    pub name: Option<String>,
}
