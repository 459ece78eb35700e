//! Derived thread status and unresolved-comment report types.

use super::{CommentId, ReviewComment};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Remote resolution state of one thread at the time it was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThreadStatus {
    /// Comment the thread belongs to.
    pub comment_id: CommentId,
    /// Whether the remote thread was resolved.
    pub resolved: bool,
    /// When the remote state was observed.
    pub last_checked_at: DateTime<Utc>,
}

/// Classification bucket for a remotely present comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentProgress {
    /// No task has been generated for the comment yet.
    Unanalyzed,
    /// At least one task for the comment is still open.
    InProgress,
    /// All tasks are finished, or the remote thread is resolved.
    Resolved,
}

impl CommentProgress {
    /// Returns the canonical display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unanalyzed => "unanalyzed",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }
}

/// Count-only view of an [`UnresolvedReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Comments without any task.
    pub unanalyzed: usize,
    /// Comments with open tasks.
    pub in_progress: usize,
    /// Comments considered resolved.
    pub resolved: usize,
    /// Locally known comments that no longer exist remotely.
    pub stale: usize,
}

/// Classification of remote comments against local tasks.
///
/// The three comment buckets are disjoint and together cover every comment
/// present remotely. Stale comments are tracked separately and never appear
/// in a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnresolvedReport {
    unanalyzed: Vec<ReviewComment>,
    in_progress: Vec<ReviewComment>,
    resolved: Vec<ReviewComment>,
    stale: Vec<CommentId>,
    thread_statuses: Vec<ThreadStatus>,
}

impl UnresolvedReport {
    pub(super) fn push(&mut self, progress: CommentProgress, comment: ReviewComment) {
        match progress {
            CommentProgress::Unanalyzed => self.unanalyzed.push(comment),
            CommentProgress::InProgress => self.in_progress.push(comment),
            CommentProgress::Resolved => self.resolved.push(comment),
        }
    }

    pub(super) fn push_stale(&mut self, comment_id: CommentId) {
        self.stale.push(comment_id);
    }

    pub(super) fn push_thread_status(&mut self, status: ThreadStatus) {
        self.thread_statuses.push(status);
    }

    /// Returns comments with no task yet.
    #[must_use]
    pub fn unanalyzed(&self) -> &[ReviewComment] {
        &self.unanalyzed
    }

    /// Returns comments with at least one open task.
    #[must_use]
    pub fn in_progress(&self) -> &[ReviewComment] {
        &self.in_progress
    }

    /// Returns comments that are resolved locally or remotely.
    #[must_use]
    pub fn resolved(&self) -> &[ReviewComment] {
        &self.resolved
    }

    /// Returns identifiers of locally known comments missing remotely.
    #[must_use]
    pub fn stale(&self) -> &[CommentId] {
        &self.stale
    }

    /// Returns the remote thread state observed for each remote comment.
    #[must_use]
    pub fn thread_statuses(&self) -> &[ThreadStatus] {
        &self.thread_statuses
    }

    /// Returns the bucket a remote comment was placed in.
    ///
    /// Returns `None` for stale or unknown comments.
    #[must_use]
    pub fn progress_of(&self, comment_id: CommentId) -> Option<CommentProgress> {
        let contains = |bucket: &[ReviewComment]| bucket.iter().any(|c| c.id() == comment_id);
        if contains(&self.unanalyzed) {
            Some(CommentProgress::Unanalyzed)
        } else if contains(&self.in_progress) {
            Some(CommentProgress::InProgress)
        } else if contains(&self.resolved) {
            Some(CommentProgress::Resolved)
        } else {
            None
        }
    }

    /// Returns bucket sizes.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            unanalyzed: self.unanalyzed.len(),
            in_progress: self.in_progress.len(),
            resolved: self.resolved.len(),
            stale: self.stale.len(),
        }
    }

    /// Returns `true` when every remote comment is resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unanalyzed.is_empty() && self.in_progress.is_empty()
    }
}
