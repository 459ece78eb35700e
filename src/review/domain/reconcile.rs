//! Classification of remote review comments against local tasks.

use super::{CommentId, CommentProgress, ReviewComment, ThreadStatus, UnresolvedReport};
use crate::task::domain::Task;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Classifies every remotely present comment as unanalyzed, in progress, or
/// resolved.
///
/// A comment is resolved when its remote thread is resolved, regardless of
/// local task state, or when every task derived from it is `done` or
/// `cancel`. Comments known locally but absent remotely are reported as
/// stale. Synthetic tasks (zero comment ID) never match a comment.
#[must_use]
pub fn reconcile(
    local: &[ReviewComment],
    remote: &[ReviewComment],
    tasks: &[Task],
    checked_at: DateTime<Utc>,
) -> UnresolvedReport {
    let mut all_terminal_by_comment: HashMap<CommentId, bool> = HashMap::new();
    for task in tasks {
        let comment_id = task.source_comment_id();
        if comment_id.is_synthetic() {
            continue;
        }
        let entry = all_terminal_by_comment.entry(comment_id).or_insert(true);
        *entry = *entry && task.status().is_terminal();
    }

    let mut report = UnresolvedReport::default();
    let mut remote_ids = HashSet::with_capacity(remote.len());
    for comment in remote {
        if !remote_ids.insert(comment.id()) {
            continue;
        }
        report.push_thread_status(ThreadStatus {
            comment_id: comment.id(),
            resolved: comment.is_resolved(),
            last_checked_at: checked_at,
        });
        let progress = if comment.is_resolved() {
            CommentProgress::Resolved
        } else {
            match all_terminal_by_comment.get(&comment.id()) {
                None => CommentProgress::Unanalyzed,
                Some(true) => CommentProgress::Resolved,
                Some(false) => CommentProgress::InProgress,
            }
        };
        report.push(progress, comment.clone());
    }

    let mut seen_stale = HashSet::new();
    for comment in local {
        if !remote_ids.contains(&comment.id()) && seen_stale.insert(comment.id()) {
            report.push_stale(comment.id());
        }
    }
    report
}
