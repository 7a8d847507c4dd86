//! Retrying transport shared by the auth and API clients
//!
//! Throttled (429) and server-side (5xx) answers and connect or timeout
//! failures are retried with exponential backoff. Everything else is handed
//! back untouched so the caller can map the status.

use std::time::Duration;

use cxform_common::{retry_with_policy, RetryDecision, RetryError, RetryPolicy};
use cxform_domain::{CxError, HttpSettings};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::InfraError;

const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);
const MAX_BACKOFF_SHIFT: u32 = 8;

/// One failed exchange, classified for the retry policy
#[derive(Debug)]
enum Failure {
    Fatal(CxError),
    Status(Response),
    Transport(reqwest::Error),
}

/// Backoff doubles per attempt unless the server names its own delay.
struct TransientPolicy {
    base_backoff: Duration,
}

impl TransientPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.base_backoff.saturating_mul(1 << shift)
    }
}

impl RetryPolicy<Failure> for TransientPolicy {
    fn should_retry(&self, error: &Failure, attempt: u32) -> RetryDecision {
        match error {
            Failure::Status(response) => {
                let delay = retry_after(response).unwrap_or_else(|| self.backoff(attempt));
                warn!(status = %response.status(), ?delay, "Retrying throttled or failed request");
                RetryDecision::RetryAfter(delay)
            }
            Failure::Transport(err) if err.is_timeout() || err.is_connect() => {
                RetryDecision::RetryAfter(self.backoff(attempt))
            }
            Failure::Transport(_) | Failure::Fatal(_) => RetryDecision::Stop,
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn retry_after(response: &Response) -> Option<Duration> {
    let seconds: u64 = response.headers().get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER))
}

fn transport_error(err: reqwest::Error) -> CxError {
    InfraError::from(err).into()
}

/// reqwest client plus the attempt budget from [`HttpSettings`]
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_attempts: usize,
    policy_backoff: Duration,
    cancel: CancellationToken,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn from_settings(settings: &HttpSettings) -> Result<Self, CxError> {
        Self::builder()
            .timeout(settings.timeout())
            .max_attempts(settings.max_attempts)
            .base_backoff(settings.base_backoff())
            .build()
    }

    /// Bind retry waits to `cancel`.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn request<U: reqwest::IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send `builder`, repeating transient failures.
    ///
    /// Once attempts run out the last 429/5xx response is returned as is.
    /// The body must be buffered so the request can be cloned.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, CxError> {
        let policy = TransientPolicy { base_backoff: self.policy_backoff };
        let attempts = u32::try_from(self.max_attempts).unwrap_or(u32::MAX);

        let outcome = retry_with_policy(attempts, self.policy_backoff, &policy, &self.cancel, || {
            let attempt = builder.try_clone();
            async move {
                let request = attempt
                    .ok_or_else(|| {
                        Failure::Fatal(CxError::Internal(
                            "request body is a stream and cannot be retried".into(),
                        ))
                    })?
                    .build()
                    .map_err(|err| Failure::Fatal(transport_error(err)))?;
                debug!(method = %request.method(), url = %request.url(), "Sending request");

                match self.client.execute(request).await {
                    Ok(response) if is_transient(response.status()) => {
                        Err(Failure::Status(response))
                    }
                    Ok(response) => Ok(response),
                    Err(err) => Err(Failure::Transport(err)),
                }
            }
        })
        .await;

        match outcome {
            Ok(response) => Ok(response),
            Err(RetryError::Cancelled { attempts }) => {
                Err(CxError::Cancelled(format!("request cancelled after {attempts} attempts")))
            }
            Err(
                RetryError::AttemptsExhausted { last, .. }
                | RetryError::NonRetryable { error: last },
            ) => match last {
                Failure::Fatal(err) => Err(err),
                Failure::Status(response) => Ok(response),
                Failure::Transport(err) => Err(transport_error(err)),
            },
        }
    }
}

/// Builder for [`HttpClient`]
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        let defaults = HttpSettings::default();
        Self {
            timeout: defaults.timeout(),
            max_attempts: defaults.max_attempts,
            base_backoff: defaults.base_backoff(),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts, the first try included.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, CxError> {
        let agent =
            self.user_agent.unwrap_or_else(|| format!("cxform/{}", env!("CARGO_PKG_VERSION")));
        let client = Client::builder()
            .timeout(self.timeout)
            .no_proxy()
            .user_agent(agent)
            .build()
            .map_err(transport_error)?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            policy_backoff: self.base_backoff,
            cancel: CancellationToken::new(),
        })
    }
}
