//! Thread status reporting against the remote review host.

use crate::review::{
    domain::{ReviewUnit, UnresolvedReport, reconcile},
    ports::{ReviewCache, ReviewCacheError, ReviewHost, ReviewHostError},
};
use crate::task::ports::{TaskStore, TaskStoreError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors raised while computing thread status.
#[derive(Debug, Error)]
pub enum ThreadStatusError {
    /// The remote host could not be queried.
    #[error(transparent)]
    Host(#[from] ReviewHostError),
    /// The local comment cache could not be read.
    #[error(transparent)]
    Cache(#[from] ReviewCacheError),
    /// The task collection could not be loaded.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Compares cached comments, remote comments, and local tasks.
///
/// The check is read-only: neither the cache nor the task store is
/// modified.
#[derive(Clone)]
pub struct ThreadStatusService<H, R, S, C>
where
    H: ReviewHost,
    R: ReviewCache,
    S: TaskStore,
    C: Clock + Send + Sync,
{
    host: Arc<H>,
    cache: Arc<R>,
    store: Arc<S>,
    clock: Arc<C>,
}

impl<H, R, S, C> ThreadStatusService<H, R, S, C>
where
    H: ReviewHost,
    R: ReviewCache,
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates the service.
    #[must_use]
    pub const fn new(host: Arc<H>, cache: Arc<R>, store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            host,
            cache,
            store,
            clock,
        }
    }

    /// Builds the unresolved-comment report for a review unit.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadStatusError`] when the host, cache, or store fails.
    #[instrument(skip(self), fields(review_unit = %unit))]
    pub async fn check(&self, unit: ReviewUnit) -> Result<UnresolvedReport, ThreadStatusError> {
        let remote = self.host.fetch_comments(unit).await?;
        let local = self.cache.load(unit).await?;
        let tasks = self.store.load(unit).await?;
        let report = reconcile(&local, &remote, &tasks, self.clock.utc());
        let summary = report.summary();
        info!(
            unanalyzed = summary.unanalyzed,
            in_progress = summary.in_progress,
            resolved = summary.resolved,
            stale = summary.stale,
            "thread status computed"
        );
        Ok(report)
    }
}
