//! Shared harness for adapter tests against a WireMock server.

#![allow(dead_code)]

use cxform_core::{Lifecycle, OpContext};
use cxform_domain::{HttpSettings, ProviderConfig, ReconcileSettings};
use cxform_infra::Provider;
use wiremock::MockServer;

/// Route adapter logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Millisecond-scale waits so eventual-consistency paths finish quickly.
pub fn fast_reconcile() -> ReconcileSettings {
    ReconcileSettings {
        read_timeout_ms: 500,
        delete_timeout_ms: 300,
        search_timeout_ms: 2_000,
        poll_interval_ms: 20,
        settle_delay_ms: 0,
        idp_settle_delay_ms: 0,
        flow_job_timeout_ms: 2_000,
        version_retry_attempts: 3,
    }
}

/// Provider pointed at `server` with a static bearer token and no transport
/// retries.
pub fn provider(server: &MockServer) -> Provider {
    init_tracing();
    let config = ProviderConfig {
        api_url: Some(server.uri()),
        access_token: Some("test-token".into()),
        http: HttpSettings { timeout_secs: 5, max_attempts: 1, base_backoff_ms: 1 },
        reconcile: fast_reconcile(),
        ..ProviderConfig::default()
    };
    Provider::new(config).expect("provider should build")
}

pub fn lifecycle(server: &MockServer, type_name: &str) -> Lifecycle {
    provider(server).lifecycle(type_name).expect("type is registered")
}

pub fn op_context(server: &MockServer) -> OpContext {
    provider(server).op_context()
}
