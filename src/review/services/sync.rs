//! Fetch-and-cache of remote review comments.

use crate::review::{
    domain::{ReviewComment, ReviewUnit},
    ports::{ReviewCache, ReviewCacheError, ReviewHost, ReviewHostError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised while refreshing the local comment cache.
#[derive(Debug, Error)]
pub enum ReviewSyncError {
    /// The remote host could not be queried.
    #[error(transparent)]
    Host(#[from] ReviewHostError),
    /// The local cache could not be written.
    #[error(transparent)]
    Cache(#[from] ReviewCacheError),
}

/// Comments fetched by one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Comments still needing analysis, in remote order.
    pub pending: Vec<ReviewComment>,
    /// Total comments fetched and cached.
    pub fetched: usize,
    /// Comments left out because their thread is resolved.
    pub skipped_resolved: usize,
}

/// Keeps the local comment cache in step with the review host.
#[derive(Clone)]
pub struct ReviewSyncService<H, R>
where
    H: ReviewHost,
    R: ReviewCache,
{
    host: Arc<H>,
    cache: Arc<R>,
}

impl<H, R> ReviewSyncService<H, R>
where
    H: ReviewHost,
    R: ReviewCache,
{
    /// Creates the service.
    #[must_use]
    pub const fn new(host: Arc<H>, cache: Arc<R>) -> Self {
        Self { host, cache }
    }

    /// Fetches remote comments, caches all of them, and returns those that
    /// still need analysis.
    ///
    /// With `skip_resolved`, comments on resolved threads are cached but not
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewSyncError`] when fetching or caching fails.
    #[instrument(skip(self), fields(review_unit = %unit))]
    pub async fn refresh(
        &self,
        unit: ReviewUnit,
        skip_resolved: bool,
    ) -> Result<SyncOutcome, ReviewSyncError> {
        let comments = self.host.fetch_comments(unit).await?;
        self.cache.save(unit, &comments).await?;

        let fetched = comments.len();
        let pending: Vec<ReviewComment> = comments
            .into_iter()
            .filter(|comment| !(skip_resolved && comment.is_resolved()))
            .collect();
        let skipped_resolved = fetched.saturating_sub(pending.len());
        debug!(fetched, skipped_resolved, "review comments refreshed");
        Ok(SyncOutcome {
            pending,
            fetched,
            skipped_resolved,
        })
    }
}
