//! Review comment snapshots fetched from the remote host.

use super::{CommentId, ReviewId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable unit of review feedback.
///
/// Comments are created by a fetch from the review host and never mutated
/// locally; a newer fetch produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    id: CommentId,
    review_id: ReviewId,
    body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diff_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    resolved: bool,
}

impl ReviewComment {
    /// Creates an unresolved comment without location metadata.
    #[must_use]
    pub fn new(id: CommentId, review_id: ReviewId, body: impl Into<String>) -> Self {
        Self {
            id,
            review_id,
            body: body.into(),
            file_path: None,
            line: None,
            diff_context: None,
            author: None,
            created_at: None,
            resolved: false,
        }
    }

    /// Sets the file path and line the comment is attached to.
    #[must_use]
    pub fn with_location(mut self, file_path: impl Into<String>, line: Option<u32>) -> Self {
        self.file_path = Some(file_path.into());
        self.line = line;
        self
    }

    /// Sets the diff hunk shown alongside the comment.
    #[must_use]
    pub fn with_diff_context(mut self, diff_context: impl Into<String>) -> Self {
        self.diff_context = Some(diff_context.into());
        self
    }

    /// Sets the comment author login.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the remote resolution flag.
    #[must_use]
    pub const fn with_resolved(mut self, resolved: bool) -> Self {
        self.resolved = resolved;
        self
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the parent review identifier.
    #[must_use]
    pub const fn review_id(&self) -> ReviewId {
        self.review_id
    }

    /// Returns the comment body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the file path, if the comment is attached to a file.
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Returns the line number, if known.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    /// Returns the diff context, if supplied by the host.
    #[must_use]
    pub fn diff_context(&self) -> Option<&str> {
        self.diff_context.as_deref()
    }

    /// Returns the author login, if known.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Returns the remote creation timestamp, if known.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns `true` when the remote thread has been marked resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }
}
