//! API authentication
//!
//! Bearer tokens come from an [`AccessTokenProvider`]. Either a pre-issued
//! token ([`StaticToken`]) or the OAuth client-credentials grant
//! ([`ClientCredentialsAuth`]), cached until shortly before expiry.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use cxform_domain::{CxError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::errors::response_error;
use crate::http::HttpClient;

/// Tokens are refreshed this long before the server says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, refreshing it if needed.
    async fn access_token(&self) -> Result<String>;
}

/// A fixed bearer token
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// OAuth client-credentials grant against the region's login host
pub struct ClientCredentialsAuth {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsAuth {
    pub fn new(
        http: HttpClient,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cached: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        debug!(url = %self.token_url, "Requesting client-credentials token");
        let request = self
            .http
            .request(Method::POST, &self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials");

        let response = self.http.send(request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CxError::Network(format!("Failed to read token response: {e}")))?;

        if !status.is_success() {
            let err = response_error(status, &body);
            return Err(match err {
                CxError::Auth(_) => err,
                other => CxError::Auth(format!("token request failed: {other}")),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| CxError::Auth(format!("Invalid token response: {e}")))
    }
}

impl fmt::Debug for ClientCredentialsAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsAuth")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccessTokenProvider for ClientCredentialsAuth {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(current) = cached.as_ref() {
            if Instant::now() < current.refresh_at {
                return Ok(current.token.clone());
            }
        }

        let response = self.request_token().await?;
        let lifetime = Duration::from_secs(response.expires_in.unwrap_or(0));
        let refresh_at = Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN);
        info!(expires_in = ?lifetime, "Obtained access token");

        let token = response.access_token;
        *cached = Some(CachedToken { token: token.clone(), refresh_at });
        Ok(token)
    }
}
