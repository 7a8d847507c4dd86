//! Domain constants
//!
//! Centralized location for vendor conventions and reconcile defaults.

// Pagination
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// Entity lifecycle states reported by the server
pub const STATE_ACTIVE: &str = "active";
pub const STATE_INACTIVE: &str = "inactive";
pub const STATE_DELETED: &str = "deleted";
pub const STATE_DISABLED: &str = "disabled";

// Exporter conventions
pub const STATIC_ACTION_PREFIX: &str = "static";

// Singleton identity provider
pub const GENERIC_IDP_ID: &str = "generic";

// Integration action templates
pub const REQUEST_TEMPLATE_NAME: &str = "requesttemplate.vm";
pub const SUCCESS_TEMPLATE_NAME: &str = "successtemplate.vm";

// Reconcile defaults (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_DELETE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 5_000;
pub const DEFAULT_IDP_SETTLE_DELAY_MS: u64 = 20_000;
pub const DEFAULT_FLOW_JOB_TIMEOUT_MS: u64 = 900_000;
pub const DEFAULT_VERSION_RETRY_ATTEMPTS: u32 = 3;

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_HTTP_BASE_BACKOFF_MS: u64 = 200;

// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";
