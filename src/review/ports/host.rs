//! Remote review host port: comment fetch and thread side effects.

use crate::review::domain::{CommentId, ReviewComment, ReviewUnit};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for review host operations.
pub type ReviewHostResult<T> = Result<T, ReviewHostError>;

/// Contract for the remote system hosting the review.
#[async_trait]
pub trait ReviewHost: Send + Sync {
    /// Fetches all review comments for a review unit, including their remote
    /// resolution flags.
    async fn fetch_comments(&self, unit: ReviewUnit) -> ReviewHostResult<Vec<ReviewComment>>;

    /// Posts a reply to the thread of the given comment.
    async fn post_reply(
        &self,
        unit: ReviewUnit,
        comment_id: CommentId,
        body: &str,
    ) -> ReviewHostResult<()>;

    /// Marks the thread of the given comment as resolved.
    async fn resolve_thread(&self, unit: ReviewUnit, comment_id: CommentId)
    -> ReviewHostResult<()>;
}

/// Errors returned by review host adapters.
#[derive(Debug, Clone, Error)]
pub enum ReviewHostError {
    /// The review unit does not exist remotely.
    #[error("review unit {0} not found on host")]
    UnitNotFound(ReviewUnit),

    /// The comment thread does not exist remotely.
    #[error("comment {0} not found on host")]
    CommentNotFound(CommentId),

    /// The host rejected or failed the request.
    #[error("review host request failed: {0}")]
    Request(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReviewHostError {
    /// Wraps a transport or API error.
    pub fn request(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Request(Arc::new(err))
    }
}
