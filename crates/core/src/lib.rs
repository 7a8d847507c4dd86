//! # cxform Core
//!
//! Reconciliation model - no HTTP or vendor code.
//!
//! This crate contains:
//! - The typed attribute model and resource schemas
//! - Port interfaces ([`ResourceAdapter`], [`DataSource`]) and their registry
//! - The eventually-consistent CRUD policy helpers
//! - The plan/apply driver
//!
//! ## Architecture Principles
//! - Only depends on `cxform-common` and `cxform-domain`
//! - Adapters live in `cxform-infra` and are reached through traits
//! - Every wait honours the caller's cancellation token

pub mod context;
pub mod diff;
pub mod lifecycle;
pub mod ports;
pub mod reconcile;
pub mod registry;
pub mod schema;
pub mod state;

pub use context::{OpContext, ReconcilePolicy};
pub use lifecycle::{plan, Lifecycle, Plan, RefreshOutcome, ResourceState};
pub use ports::{
    prune_references, DataSource, ExportedResources, RefAttr, RemoveIfMissing, ResourceAdapter,
    ResourceMeta,
};
pub use registry::Registry;
pub use schema::{AttrType, Attribute, Schema};
pub use state::{AttrValue, Attributes, ResourceData};
