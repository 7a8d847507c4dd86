//! Wire types for the contact-center REST API
//!
//! Optional fields are `Option` and skipped when absent so that "unset" is
//! distinguishable from "explicitly cleared".

pub mod architect;
pub mod common;
pub mod idp;
pub mod integration;
pub mod location;
pub mod oauth;
pub mod routing;
pub mod telephony;

pub use architect::{ArchitectJobStatus, Flow, JobMessage, RegisterArchitectJob, ScheduleGroup};
pub use common::{ApiErrorBody, DomainEntityRef, EntityListing};
pub use idp::GenericSaml;
pub use integration::{
    ActionConfig, ActionContract, ActionInput, ActionOutput, Credential, CredentialType,
    IntegrationAction, RequestConfig, ResponseConfig, UpdateActionInput,
};
pub use location::{EmergencyNumber, Location, LocationAddress, LocationCreate, LocationUpdate};
pub use oauth::{Division, OAuthClient, RoleDivision};
pub use routing::Queue;
pub use telephony::{Line, Phone, PhoneBaseSettings, PhoneCapabilities, Station};
