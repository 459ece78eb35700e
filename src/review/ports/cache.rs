//! Local cache of the last fetched review comments.

use crate::review::domain::{ReviewComment, ReviewUnit};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for review cache operations.
pub type ReviewCacheResult<T> = Result<T, ReviewCacheError>;

/// Persistence contract for the locally known comment snapshot.
#[async_trait]
pub trait ReviewCache: Send + Sync {
    /// Loads the cached comments; empty when nothing has been cached.
    async fn load(&self, unit: ReviewUnit) -> ReviewCacheResult<Vec<ReviewComment>>;

    /// Replaces the cached comments atomically.
    async fn save(&self, unit: ReviewUnit, comments: &[ReviewComment]) -> ReviewCacheResult<()>;
}

/// Errors returned by review cache adapters.
#[derive(Debug, Clone, Error)]
pub enum ReviewCacheError {
    /// Persistence-layer failure.
    #[error("review cache persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReviewCacheError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
