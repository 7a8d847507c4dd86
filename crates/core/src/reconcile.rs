//! Eventually-consistent CRUD policy
//!
//! The platform acknowledges mutations before their effects are visible.
//! These helpers wrap single API calls with the bounded waits every adapter
//! needs:
//!
//! - [`read_entity`]: tolerate not-found for a while after create
//! - [`confirm_deleted`]: wait until a deleted entity is really gone
//! - [`update_with_version_retry`]: re-read and retry on a stale version
//! - [`settle`]: fixed wait for effects the server gives no signal for
//! - [`search_until_found`]: wait out search indexing lag
//! - [`collect_pages`]: page-number pagination until a short page
//!
//! Transient errors are absorbed inside the configured budget. Everything
//! else propagates unchanged.

use std::future::Future;
use std::time::Duration;

use cxform_common::resilience::{self, PollConfig, PollError, PollStep, RetryError};
use cxform_domain::{CxError, Result};
use tracing::{debug, info, warn};

use crate::context::OpContext;
use crate::state::ResourceData;

fn from_poll_error(err: PollError<CxError>, what: &str) -> CxError {
    match err {
        PollError::TimedOut { elapsed, last_reason } => CxError::retry_exhausted(
            elapsed,
            match last_reason {
                Some(reason) => format!("{what}: {reason}"),
                None => what.to_string(),
            },
        ),
        PollError::Failed(err) => err,
        PollError::Cancelled => CxError::Cancelled(what.to_string()),
    }
}

/// Poll `check` until it is ready, within `timeout`.
///
/// Building block for the other helpers and for adapters that wait on a
/// server-side job.
pub async fn poll<T, F, Fut>(
    ctx: &OpContext,
    timeout: Duration,
    what: &str,
    check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStep<T>>>,
{
    let config = PollConfig::new(timeout, ctx.policy().poll_interval);
    resilience::poll_until(config, ctx.cancel_token(), check)
        .await
        .map_err(|err| from_poll_error(err, what))
}

/// Fetch the entity behind `data`.
///
/// Right after create the entity may not be visible yet, so not-found is
/// retried until the read timeout and then reported as `RetryExhausted`.
/// During a routine refresh not-found means the entity was removed out of
/// band and `Ok(None)` is returned; the caller clears the id.
pub async fn read_entity<T, F, Fut>(
    ctx: &OpContext,
    data: &ResourceData,
    kind: &str,
    mut fetch: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let id = data.id().unwrap_or_default();

    if data.is_new_resource() {
        let what = format!("{kind} {id} not visible after create");
        let value = poll(ctx, ctx.policy().read_timeout, &what, || {
            let attempt = fetch();
            async move {
                match attempt.await {
                    Ok(value) => Ok(PollStep::Ready(value)),
                    Err(CxError::NotFound(message)) => Ok(PollStep::Pending(message)),
                    Err(err) => Err(err),
                }
            }
        })
        .await?;
        return Ok(Some(value));
    }

    match fetch().await {
        Ok(value) => Ok(Some(value)),
        Err(CxError::NotFound(message)) => {
            info!(kind, id, %message, "Entity not found, removing from state");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Wait until a deleted entity reads as not-found, or as a terminal state
/// according to `is_gone`.
pub async fn confirm_deleted<T, F, Fut, G>(
    ctx: &OpContext,
    kind: &str,
    id: &str,
    mut fetch: F,
    is_gone: G,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    G: Fn(&T) -> bool,
{
    let what = format!("{kind} {id} still exists after delete");
    let is_gone = &is_gone;
    poll(ctx, ctx.policy().delete_timeout, &what, || {
        let attempt = fetch();
        async move {
            match attempt.await {
                Err(CxError::NotFound(_)) => Ok(PollStep::Ready(())),
                Ok(entity) if is_gone(&entity) => Ok(PollStep::Ready(())),
                Ok(_) => Ok(PollStep::Pending("entity still readable".to_string())),
                Err(err) => Err(err),
            }
        }
    })
    .await?;
    debug!(kind, id, "Confirmed deletion");
    Ok(())
}

/// Run an optimistic-concurrency update, retrying on `VersionConflict`.
///
/// `op` must fetch the current version itself on every attempt.
pub async fn update_with_version_retry<T, F, Fut>(
    ctx: &OpContext,
    kind: &str,
    id: &str,
    op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = ctx.policy().version_retry_attempts;
    let retryable = CxError::is_version_conflict;
    resilience::retry_when(attempts, Duration::ZERO, retryable, ctx.cancel_token(), op)
        .await
        .map_err(|err| match err {
            RetryError::AttemptsExhausted { attempts, last } => {
                warn!(kind, id, attempts, "Update kept failing with a stale version");
                last
            }
            RetryError::NonRetryable { error } => error,
            RetryError::Cancelled { .. } => CxError::Cancelled(format!("update of {kind} {id}")),
        })
}

/// Wait a fixed delay after an update whose effect is not immediately
/// readable.
pub async fn settle(ctx: &OpContext, delay: Duration) -> Result<()> {
    resilience::settle(delay, ctx.cancel_token())
        .await
        .map_err(|_| CxError::Cancelled("settle delay".into()))
}

/// Retry a lookup until it finds something, within the search timeout.
pub async fn search_until_found<T, F, Fut>(ctx: &OpContext, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let description = format!("no {what} found");
    poll(ctx, ctx.policy().search_timeout, &description, || {
        let attempt = op();
        async move {
            Ok(match attempt.await? {
                Some(found) => PollStep::Ready(found),
                None => PollStep::Pending(format!("{what} not indexed yet")),
            })
        }
    })
    .await
}

/// Accumulate every page, starting at page 1, until an empty or short page.
pub async fn collect_pages<T, F, Fut>(
    ctx: &OpContext,
    page_size: u32,
    mut fetch_page: F,
) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let page_size_len = usize::try_from(page_size).unwrap_or(usize::MAX);
    let mut all = Vec::new();
    let mut page_number = 1;

    loop {
        if ctx.is_cancelled() {
            return Err(CxError::Cancelled("pagination".into()));
        }
        let page = fetch_page(page_number).await?;
        let count = page.len();
        all.extend(page);
        if count == 0 || count < page_size_len {
            break;
        }
        page_number += 1;
    }

    debug!(pages = page_number, total = all.len(), "Collected pages");
    Ok(all)
}
