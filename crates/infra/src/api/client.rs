//! Authenticated JSON client for the platform REST API
//!
//! Every call attaches a bearer token from the configured
//! [`AccessTokenProvider`] and maps non-success statuses through
//! [`crate::errors::response_error`], so adapters only ever see `CxError`.

use std::collections::BTreeMap;
use std::sync::Arc;

use cxform_domain::{CxError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::auth::AccessTokenProvider;
use crate::errors::response_error;
use crate::http::HttpClient;

/// Platform API client shared by every adapter
pub struct PlatformClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

impl PlatformClient {
    /// Create a client for `base_url` (e.g. `https://api.mypurecloud.com`).
    pub fn new(
        base_url: impl Into<String>,
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, auth, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| CxError::Internal(format!("Invalid request URL for {path}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<Response> {
        let token = self.auth.access_token().await?;
        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {token}"));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = self.http.send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(%status, body = %body, "Request rejected");
        Err(response_error(status, &body))
    }

    fn to_body<B: Serialize>(body: &B) -> Result<Value> {
        serde_json::to_value(body)
            .map_err(|e| CxError::Internal(format!("Failed to serialize request body: {e}")))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CxError::Network(format!("Failed to read response body: {e}")))?;

        // 204/205 and empty bodies carry no payload
        if status == StatusCode::NO_CONTENT
            || status == StatusCode::RESET_CONTENT
            || text.trim().is_empty()
        {
            return serde_json::from_value(Value::Null).map_err(|_| {
                CxError::Internal(format!(
                    "Empty response ({}) where a body was expected",
                    status.as_u16()
                ))
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| CxError::Internal(format!("Failed to parse response: {e}")))
    }

    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path, query)?;
        debug!(url = %url, "GET request");
        let response = self.execute(Method::GET, url, None).await?;
        Self::read_json(response).await
    }

    /// GET a plain-text sub-resource such as a template.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.url(path, &[])?;
        let response = self.execute(Method::GET, url, None).await?;
        response
            .text()
            .await
            .map_err(|e| CxError::Network(format!("Failed to read response body: {e}")))
    }

    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.url(path, &[])?;
        debug!(url = %url, "POST request");
        let response = self.execute(Method::POST, url, Some(Self::to_body(body)?)).await?;
        Self::read_json(response).await
    }

    /// POST without a request body, discarding any response.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn post_empty(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        let url = self.url(path, query)?;
        debug!(url = %url, "POST request");
        self.execute(Method::POST, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.url(path, &[])?;
        debug!(url = %url, "PUT request");
        let response = self.execute(Method::PUT, url, Some(Self::to_body(body)?)).await?;
        Self::read_json(response).await
    }

    /// PUT without a request body, discarding any response.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn put_empty(&self, path: &str) -> Result<()> {
        let url = self.url(path, &[])?;
        debug!(url = %url, "PUT request");
        self.execute(Method::PUT, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn patch<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = self.url(path, &[])?;
        debug!(url = %url, "PATCH request");
        let response = self.execute(Method::PATCH, url, Some(Self::to_body(body)?)).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path, &[])?;
        debug!(url = %url, "DELETE request");
        self.execute(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// PUT raw bytes to an absolute presigned URL. No bearer token is sent.
    #[instrument(skip(self, headers, content), fields(bytes = content.len()))]
    pub async fn upload(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        content: Vec<u8>,
    ) -> Result<()> {
        let mut request = self.http.request(Method::PUT, url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !headers.keys().any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())) {
            request = request.header(CONTENT_TYPE, "application/octet-stream");
        }
        let response = self.http.send(request.body(content)).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(response_error(status, &body))
    }
}
