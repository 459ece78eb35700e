//! In-memory review host and cache adapters.
//!
//! The host adapter models a remote review service without any network
//! access and can be told to fail replies or thread resolution, which makes
//! it suitable for exercising remote side-effect handling in tests.

use crate::review::{
    domain::{CommentId, ReviewComment, ReviewUnit},
    ports::{
        ReviewCache, ReviewCacheError, ReviewCacheResult, ReviewHost, ReviewHostError,
        ReviewHostResult,
    },
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// A reply recorded by [`InMemoryReviewHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedReply {
    /// Review unit the reply was posted to.
    pub unit: ReviewUnit,
    /// Comment whose thread received the reply.
    pub comment_id: CommentId,
    /// Reply body.
    pub body: String,
}

/// In-memory review host.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewHost {
    state: Arc<RwLock<InMemoryHostState>>,
}

#[derive(Debug, Default)]
struct InMemoryHostState {
    comments: HashMap<ReviewUnit, Vec<ReviewComment>>,
    replies: Vec<PostedReply>,
    resolved_threads: HashSet<(ReviewUnit, CommentId)>,
    fail_replies: bool,
    fail_resolves: bool,
}

fn lock_error(err: impl std::fmt::Display) -> ReviewHostError {
    ReviewHostError::request(std::io::Error::other(err.to_string()))
}

fn injected_failure(operation: &str) -> ReviewHostError {
    ReviewHostError::request(std::io::Error::other(format!(
        "{operation} rejected by host"
    )))
}

impl InMemoryReviewHost {
    /// Creates an empty in-memory host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the comments the host reports for a review unit.
    ///
    /// # Errors
    ///
    /// Returns host errors when lock acquisition fails.
    pub fn set_comments(
        &self,
        unit: ReviewUnit,
        comments: Vec<ReviewComment>,
    ) -> ReviewHostResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.comments.insert(unit, comments);
        Ok(())
    }

    /// Makes subsequent reply posts fail (or succeed again).
    ///
    /// # Errors
    ///
    /// Returns host errors when lock acquisition fails.
    pub fn fail_replies(&self, fail: bool) -> ReviewHostResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.fail_replies = fail;
        Ok(())
    }

    /// Makes subsequent thread resolutions fail (or succeed again).
    ///
    /// # Errors
    ///
    /// Returns host errors when lock acquisition fails.
    pub fn fail_resolves(&self, fail: bool) -> ReviewHostResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.fail_resolves = fail;
        Ok(())
    }

    /// Returns every reply posted so far, in posting order.
    ///
    /// # Errors
    ///
    /// Returns host errors when lock acquisition fails.
    pub fn posted_replies(&self) -> ReviewHostResult<Vec<PostedReply>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.replies.clone())
    }

    /// Returns `true` when the thread has been resolved through this host.
    ///
    /// # Errors
    ///
    /// Returns host errors when lock acquisition fails.
    pub fn is_thread_resolved(
        &self,
        unit: ReviewUnit,
        comment_id: CommentId,
    ) -> ReviewHostResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.resolved_threads.contains(&(unit, comment_id)))
    }
}

fn ensure_comment_exists(
    state: &InMemoryHostState,
    unit: ReviewUnit,
    comment_id: CommentId,
) -> ReviewHostResult<()> {
    let comments = state
        .comments
        .get(&unit)
        .ok_or(ReviewHostError::UnitNotFound(unit))?;
    if comments.iter().any(|comment| comment.id() == comment_id) {
        Ok(())
    } else {
        Err(ReviewHostError::CommentNotFound(comment_id))
    }
}

#[async_trait]
impl ReviewHost for InMemoryReviewHost {
    async fn fetch_comments(&self, unit: ReviewUnit) -> ReviewHostResult<Vec<ReviewComment>> {
        let state = self.state.read().map_err(lock_error)?;
        state
            .comments
            .get(&unit)
            .cloned()
            .ok_or(ReviewHostError::UnitNotFound(unit))
    }

    async fn post_reply(
        &self,
        unit: ReviewUnit,
        comment_id: CommentId,
        body: &str,
    ) -> ReviewHostResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.fail_replies {
            return Err(injected_failure("reply"));
        }
        ensure_comment_exists(&state, unit, comment_id)?;
        state.replies.push(PostedReply {
            unit,
            comment_id,
            body: body.to_owned(),
        });
        Ok(())
    }

    async fn resolve_thread(
        &self,
        unit: ReviewUnit,
        comment_id: CommentId,
    ) -> ReviewHostResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.fail_resolves {
            return Err(injected_failure("thread resolution"));
        }
        ensure_comment_exists(&state, unit, comment_id)?;
        state.resolved_threads.insert((unit, comment_id));
        if let Some(comments) = state.comments.get_mut(&unit) {
            for comment in comments.iter_mut().filter(|c| c.id() == comment_id) {
                *comment = comment.clone().with_resolved(true);
            }
        }
        Ok(())
    }
}

/// In-memory review comment cache.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewCache {
    comments: Arc<RwLock<HashMap<ReviewUnit, Vec<ReviewComment>>>>,
}

impl InMemoryReviewCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn cache_lock_error(err: impl std::fmt::Display) -> ReviewCacheError {
    ReviewCacheError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ReviewCache for InMemoryReviewCache {
    async fn load(&self, unit: ReviewUnit) -> ReviewCacheResult<Vec<ReviewComment>> {
        let comments = self.comments.read().map_err(cache_lock_error)?;
        Ok(comments.get(&unit).cloned().unwrap_or_default())
    }

    async fn save(&self, unit: ReviewUnit, comments: &[ReviewComment]) -> ReviewCacheResult<()> {
        let mut cached = self.comments.write().map_err(cache_lock_error)?;
        cached.insert(unit, comments.to_vec());
        Ok(())
    }
}
