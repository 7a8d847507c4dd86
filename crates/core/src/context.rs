//! Per-operation context
//!
//! Every adapter call receives an [`OpContext`]: the caller's cancellation
//! token plus the timing policy derived from configuration.

use std::time::Duration;

use cxform_domain::ReconcileSettings;
use tokio_util::sync::CancellationToken;

/// Deadlines and delays for eventual-consistency handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePolicy {
    pub read_timeout: Duration,
    pub delete_timeout: Duration,
    pub search_timeout: Duration,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub idp_settle_delay: Duration,
    pub flow_job_timeout: Duration,
    pub version_retry_attempts: u32,
}

impl From<&ReconcileSettings> for ReconcilePolicy {
    fn from(settings: &ReconcileSettings) -> Self {
        Self {
            read_timeout: Duration::from_millis(settings.read_timeout_ms),
            delete_timeout: Duration::from_millis(settings.delete_timeout_ms),
            search_timeout: Duration::from_millis(settings.search_timeout_ms),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            settle_delay: Duration::from_millis(settings.settle_delay_ms),
            idp_settle_delay: Duration::from_millis(settings.idp_settle_delay_ms),
            flow_job_timeout: Duration::from_millis(settings.flow_job_timeout_ms),
            version_retry_attempts: settings.version_retry_attempts,
        }
    }
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self::from(&ReconcileSettings::default())
    }
}

/// Cancellation and timing for one adapter operation
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    policy: ReconcilePolicy,
}

impl OpContext {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { cancel: CancellationToken::new(), policy }
    }

    pub fn with_cancel(policy: ReconcilePolicy, cancel: CancellationToken) -> Self {
        Self { cancel, policy }
    }

    pub fn policy(&self) -> &ReconcilePolicy {
        &self.policy
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
