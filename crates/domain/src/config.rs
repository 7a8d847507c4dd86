//! Provider configuration
//!
//! A [`ProviderConfig`] is built once by the caller (see the infra config
//! loader) and handed to the provider explicitly. Every reconcile delay is a
//! tunable on [`ReconcileSettings`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DELETE_TIMEOUT_MS, DEFAULT_FLOW_JOB_TIMEOUT_MS, DEFAULT_HTTP_BASE_BACKOFF_MS,
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IDP_SETTLE_DELAY_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_REGION, DEFAULT_SEARCH_TIMEOUT_MS,
    DEFAULT_SETTLE_DELAY_MS, DEFAULT_VERSION_RETRY_ATTEMPTS,
};
use crate::errors::{CxError, Result};

/// Region name to platform domain.
const REGIONS: &[(&str, &str)] = &[
    ("dca", "inindca.com"),
    ("tca", "inintca.com"),
    ("us-east-1", "mypurecloud.com"),
    ("us-west-2", "usw2.pure.cloud"),
    ("ca-central-1", "cac1.pure.cloud"),
    ("eu-west-1", "mypurecloud.ie"),
    ("eu-west-2", "euw2.pure.cloud"),
    ("eu-central-1", "mypurecloud.de"),
    ("ap-south-1", "aps1.pure.cloud"),
    ("ap-northeast-1", "mypurecloud.jp"),
    ("ap-northeast-2", "apne2.pure.cloud"),
    ("ap-southeast-2", "mypurecloud.com.au"),
];

/// Look up the platform domain for a region name (case-insensitive).
pub fn region_domain(region: &str) -> Option<&'static str> {
    let region = region.trim().to_ascii_lowercase();
    REGIONS.iter().find(|(name, _)| *name == region).map(|(_, domain)| *domain)
}

/// Names of all known regions.
pub fn known_regions() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(name, _)| *name)
}

/// Provider-wide configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Overrides the API base URL derived from the region.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Overrides the token endpoint derived from the region.
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub oauth_client_id: Option<String>,
    #[serde(default)]
    pub oauth_client_secret: Option<String>,
    /// Pre-issued bearer token; skips the client-credentials grant.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            api_url: None,
            login_url: None,
            oauth_client_id: None,
            oauth_client_secret: None,
            access_token: None,
            http: HttpSettings::default(),
            reconcile: ReconcileSettings::default(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("region", &self.region)
            .field("api_url", &self.api_url)
            .field("login_url", &self.login_url)
            .field("oauth_client_id", &self.oauth_client_id)
            .field("oauth_client_secret", &self.oauth_client_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("http", &self.http)
            .field("reconcile", &self.reconcile)
            .finish()
    }
}

impl ProviderConfig {
    fn domain(&self) -> Result<&'static str> {
        region_domain(&self.region).ok_or_else(|| {
            let known = known_regions().collect::<Vec<_>>().join(", ");
            CxError::Config(format!("Unknown region: {} (known: {known})", self.region))
        })
    }

    /// Base URL for REST calls, e.g. `https://api.mypurecloud.com`.
    pub fn api_base_url(&self) -> Result<String> {
        match &self.api_url {
            Some(url) => Ok(url.trim_end_matches('/').to_string()),
            None => Ok(format!("https://api.{}", self.domain()?)),
        }
    }

    /// Token endpoint for the client-credentials grant.
    pub fn token_url(&self) -> Result<String> {
        match &self.login_url {
            Some(url) => Ok(url.clone()),
            None => Ok(format!("https://login.{}/oauth/token", self.domain()?)),
        }
    }

    /// Check that the configuration can produce an authenticated client.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_none() {
            self.domain()?;
        }
        self.reconcile.validate()?;
        if self.access_token.is_some() {
            return Ok(());
        }
        match (&self.oauth_client_id, &self.oauth_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok(()),
            _ => Err(CxError::Config(
                "OAuth client id and secret are required when no access token is set".into(),
            )),
        }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Total attempts for transient transport failures (initial try + retries).
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_HTTP_BASE_BACKOFF_MS,
        }
    }
}

impl HttpSettings {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub const fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

/// Tunable delays and bounds for eventual-consistency handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Deadline for a post-create read to stop returning not-found.
    pub read_timeout_ms: u64,
    /// Deadline for a deleted entity to disappear.
    pub delete_timeout_ms: u64,
    /// Deadline for search-backed lookups to find a new entity.
    pub search_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Fixed wait after updates whose effects are not immediately readable.
    pub settle_delay_ms: u64,
    /// Settle delay for identity provider updates.
    pub idp_settle_delay_ms: u64,
    pub flow_job_timeout_ms: u64,
    /// Attempts for an update rejected with a stale version.
    pub version_retry_attempts: u32,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            delete_timeout_ms: DEFAULT_DELETE_TIMEOUT_MS,
            search_timeout_ms: DEFAULT_SEARCH_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            idp_settle_delay_ms: DEFAULT_IDP_SETTLE_DELAY_MS,
            flow_job_timeout_ms: DEFAULT_FLOW_JOB_TIMEOUT_MS,
            version_retry_attempts: DEFAULT_VERSION_RETRY_ATTEMPTS,
        }
    }
}

impl ReconcileSettings {
    /// Reject settings under which polling or version retries cannot progress.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(CxError::Config("reconcile.poll_interval_ms must be positive".into()));
        }
        if self.version_retry_attempts == 0 {
            return Err(CxError::Config(
                "reconcile.version_retry_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
