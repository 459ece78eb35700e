//! Status-change hooks with remote side effects.

use crate::review::ports::ReviewHost;
use crate::task::domain::TaskStatus;
use crate::task::ports::{SideEffectOutcome, StatusChange, StatusChangeHook};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves a comment's remote thread once all of its tasks are finished.
///
/// Fires only when a task moves into `done`, its source comment is real,
/// and every sibling task derived from the same comment is `done` or
/// `cancel`.
pub struct ResolveThreadOnCompletion<H: ReviewHost> {
    host: Arc<H>,
}

impl<H: ReviewHost> ResolveThreadOnCompletion<H> {
    /// Creates the hook.
    #[must_use]
    pub const fn new(host: Arc<H>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl<H: ReviewHost> StatusChangeHook for ResolveThreadOnCompletion<H> {
    async fn after_status_change(&self, change: StatusChange<'_>) -> SideEffectOutcome {
        let comment_id = change.task.source_comment_id();
        if change.task.status() != TaskStatus::Done
            || change.previous == TaskStatus::Done
            || comment_id.is_synthetic()
        {
            return SideEffectOutcome::Skipped;
        }
        if let Some(open) = change
            .siblings
            .iter()
            .find(|sibling| !sibling.status().is_terminal())
        {
            debug!(
                comment_id = %comment_id,
                open_task = %open.id(),
                "thread left open; sibling task unfinished"
            );
            return SideEffectOutcome::Skipped;
        }
        match self.host.resolve_thread(change.unit, comment_id).await {
            Ok(()) => {
                info!(review_unit = %change.unit, comment_id = %comment_id, "resolved review thread");
                SideEffectOutcome::Applied
            }
            Err(err) => SideEffectOutcome::Failed(err.to_string()),
        }
    }
}
