//! Side-effect hook invoked after a status change is committed.

use crate::review::domain::ReviewUnit;
use crate::task::domain::{Task, TaskStatus};
use async_trait::async_trait;

/// A committed status change.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange<'a> {
    /// Review unit of the task.
    pub unit: ReviewUnit,
    /// Task after the change.
    pub task: &'a Task,
    /// Status before the change.
    pub previous: TaskStatus,
    /// Every task of the review unit derived from the same comment,
    /// including `task`.
    pub siblings: &'a [Task],
}

/// Outcome of a status side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffectOutcome {
    /// The hook decided nothing needed doing.
    Skipped,
    /// The side effect was applied.
    Applied,
    /// The side effect failed; the status change stays committed.
    Failed(String),
}

/// Hook run after a status change has been persisted.
///
/// Hooks cannot veto or roll back the change; failures are reported to the
/// caller only.
#[async_trait]
pub trait StatusChangeHook: Send + Sync {
    /// Reacts to a committed status change.
    async fn after_status_change(&self, change: StatusChange<'_>) -> SideEffectOutcome;
}
