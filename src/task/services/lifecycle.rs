//! Service layer for task lifecycle updates and merging.

use crate::review::domain::{CommentId, ReviewUnit};
use crate::task::{
    domain::{
        ImplementationStatus, MergeOutcome, MergeReport, SimilarityThreshold, Task,
        TaskDomainError, TaskId, TaskStatus, VerificationResult, merge_tasks_excluding,
    },
    ports::{SideEffectOutcome, StatusChange, StatusChangeHook, TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for TaskLifecycleError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::Domain(domain) => Self::Domain(domain),
            other => Self::Store(other),
        }
    }
}

impl TaskLifecycleError {
    /// Returns `true` when the error reports an unknown task identifier.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(TaskStoreError::NotFound(_)))
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Result of a status update that ran a side-effect hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Task after the committed change.
    pub task: Task,
    /// Status before the change.
    pub previous: TaskStatus,
    /// What the hook did.
    pub side_effect: SideEffectOutcome,
}

/// Per-status task counts for one review unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    /// Tasks in `todo`.
    pub todo: usize,
    /// Tasks in `doing`.
    pub doing: usize,
    /// Tasks in `done`.
    pub done: usize,
    /// Tasks in `pending`.
    pub pending: usize,
    /// Tasks in `cancel`.
    pub cancel: usize,
}

impl TaskSummary {
    fn count(tasks: &[Task]) -> Self {
        let mut summary = Self::default();
        for task in tasks {
            let slot = match task.status() {
                TaskStatus::Todo => &mut summary.todo,
                TaskStatus::Doing => &mut summary.doing,
                TaskStatus::Done => &mut summary.done,
                TaskStatus::Pending => &mut summary.pending,
                TaskStatus::Cancel => &mut summary.cancel,
            };
            *slot = slot.saturating_add(1);
        }
        summary
    }

    /// Returns the total number of tasks.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.todo
            .saturating_add(self.doing)
            .saturating_add(self.done)
            .saturating_add(self.pending)
            .saturating_add(self.cancel)
    }

    /// Returns `true` when every task is `done` or `cancel`.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.todo == 0 && self.doing == 0 && self.pending == 0
    }
}

fn find_mut(tasks: &mut [Task], id: TaskId) -> Result<&mut Task, TaskStoreError> {
    tasks
        .iter_mut()
        .find(|task| task.id() == id)
        .ok_or(TaskStoreError::NotFound(id))
}

/// Task lifecycle orchestration service.
///
/// Every mutation is a single atomic store operation, so concurrent readers
/// never observe a partially applied change.
#[derive(Clone)]
pub struct TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    merge_threshold: SimilarityThreshold,
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            merge_threshold: SimilarityThreshold::DEFAULT,
        }
    }

    /// Sets the similarity threshold used to match synthetic tasks on merge.
    #[must_use]
    pub const fn with_merge_threshold(mut self, threshold: SimilarityThreshold) -> Self {
        self.merge_threshold = threshold;
        self
    }

    /// Returns the shared clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Loads all tasks of a review unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when loading fails.
    pub async fn load(&self, unit: ReviewUnit) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.store.load(unit).await?)
    }

    /// Replaces all tasks of a review unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the collection violates
    /// identity invariants or persistence fails.
    pub async fn save(&self, unit: ReviewUnit, tasks: &[Task]) -> TaskLifecycleResult<()> {
        Ok(self.store.save(unit, tasks).await?)
    }

    /// Finds one task of a review unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] (wrapped) for an unknown ID.
    pub async fn find(&self, unit: ReviewUnit, id: TaskId) -> TaskLifecycleResult<Task> {
        self.store
            .load(unit)
            .await?
            .into_iter()
            .find(|task| task.id() == id)
            .ok_or(TaskLifecycleError::Store(TaskStoreError::NotFound(id)))
    }

    /// Searches every stored review unit for a task.
    ///
    /// Returns `Ok(None)` when no review unit contains the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when listing or loading fails.
    pub async fn locate(&self, id: TaskId) -> TaskLifecycleResult<Option<(ReviewUnit, Task)>> {
        for unit in self.store.review_units().await? {
            if let Some(task) = self
                .store
                .load(unit)
                .await?
                .into_iter()
                .find(|task| task.id() == id)
            {
                return Ok(Some((unit, task)));
            }
        }
        Ok(None)
    }

    /// Counts tasks per status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when loading fails.
    pub async fn summary(&self, unit: ReviewUnit) -> TaskLifecycleResult<TaskSummary> {
        let tasks = self.store.load(unit).await?;
        Ok(TaskSummary::count(&tasks))
    }

    /// Updates a task's status through the generic status path.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] for an unknown ID,
    /// [`TaskDomainError::CancelRequiresReason`] when asked to cancel, and
    /// [`TaskDomainError::InvalidStatusTransition`] for forbidden
    /// transitions.
    #[instrument(skip(self), fields(review_unit = %unit, task_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        status: TaskStatus,
    ) -> TaskLifecycleResult<Task> {
        let (task, _previous, _siblings) = self.commit_status(unit, id, status).await?;
        Ok(task)
    }

    /// Updates a task's status, then runs a side-effect hook.
    ///
    /// The status change is committed before the hook runs and stays
    /// committed whatever the hook reports.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::update_status`]; hook failures are
    /// reported in [`StatusUpdate::side_effect`] instead.
    #[instrument(skip(self, hook), fields(review_unit = %unit, task_id = %id, status = %status))]
    pub async fn update_status_with_hook<H>(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        status: TaskStatus,
        hook: &H,
    ) -> TaskLifecycleResult<StatusUpdate>
    where
        H: StatusChangeHook + ?Sized,
    {
        let (task, previous, siblings) = self.commit_status(unit, id, status).await?;
        let side_effect = hook
            .after_status_change(StatusChange {
                unit,
                task: &task,
                previous,
                siblings: &siblings,
            })
            .await;
        if let SideEffectOutcome::Failed(reason) = &side_effect {
            warn!(%reason, "status side effect failed; status change kept");
        }
        Ok(StatusUpdate {
            task,
            previous,
            side_effect,
        })
    }

    async fn commit_status(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        status: TaskStatus,
    ) -> TaskLifecycleResult<(Task, TaskStatus, Vec<Task>)> {
        let clock = &*self.clock;
        let committed = self
            .store
            .modify(unit, |tasks| {
                let task = find_mut(tasks, id)?;
                let previous = task.status();
                task.transition_to(status, clock)?;
                let updated = task.clone();
                let siblings = siblings_of(tasks, updated.source_comment_id());
                Ok((updated, previous, siblings))
            })
            .await?;
        debug!(from = %committed.1, "task status updated");
        Ok(committed)
    }

    /// Cancels a task and records whether the reason reached the remote
    /// thread.
    ///
    /// This is the only path into [`TaskStatus::Cancel`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] for an unknown ID,
    /// [`TaskDomainError::EmptyCancelReason`] for a blank reason, and
    /// [`TaskDomainError::InvalidStatusTransition`] for a `done` task.
    #[instrument(skip(self, reason), fields(review_unit = %unit, task_id = %id))]
    pub async fn update_cancel_status(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        reason: &str,
        comment_posted: bool,
    ) -> TaskLifecycleResult<Task> {
        let clock = &*self.clock;
        let task = self
            .store
            .modify(unit, |tasks| {
                let task = find_mut(tasks, id)?;
                task.cancel(reason, clock)?;
                task.set_cancel_comment_posted(comment_posted, clock)?;
                Ok(task.clone())
            })
            .await?;
        Ok(task)
    }

    /// Records that the reply for `posted_reason` reached the remote thread.
    ///
    /// The flag is set only while the stored task is still cancelled with
    /// that reason; a reason replaced in the meantime stays unposted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] for an unknown ID.
    #[instrument(skip(self, posted_reason), fields(review_unit = %unit, task_id = %id))]
    pub async fn mark_cancel_reply_posted(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        posted_reason: &str,
    ) -> TaskLifecycleResult<Task> {
        let clock = &*self.clock;
        let (task, recorded) = self
            .store
            .modify(unit, |tasks| {
                let task = find_mut(tasks, id)?;
                let recorded = task.mark_cancel_reply_posted(posted_reason, clock);
                Ok((task.clone(), recorded))
            })
            .await?;
        if !recorded {
            warn!("cancellation reason changed while its reply was posted");
        }
        Ok(task)
    }

    /// Cancels a task, keeping the posted flag when the reason is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::update_cancel_status`].
    pub async fn cancel(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        reason: &str,
    ) -> TaskLifecycleResult<Task> {
        let clock = &*self.clock;
        let task = self
            .store
            .modify(unit, |tasks| {
                let task = find_mut(tasks, id)?;
                task.cancel(reason, clock)?;
                Ok(task.clone())
            })
            .await?;
        Ok(task)
    }

    /// Records a task's implementation status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] for an unknown ID.
    pub async fn update_implementation_status(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        status: ImplementationStatus,
    ) -> TaskLifecycleResult<Task> {
        let clock = &*self.clock;
        let task = self
            .store
            .modify(unit, |tasks| {
                let task = find_mut(tasks, id)?;
                task.set_implementation_status(status, clock);
                Ok(task.clone())
            })
            .await?;
        Ok(task)
    }

    /// Appends a verification result to a task's history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] for an unknown ID.
    #[instrument(skip(self, result), fields(review_unit = %unit, task_id = %id, success = result.success))]
    pub async fn record_verification(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        result: VerificationResult,
    ) -> TaskLifecycleResult<Task> {
        let clock = &*self.clock;
        let task = self
            .store
            .modify(unit, |tasks| {
                let task = find_mut(tasks, id)?;
                task.record_verification(result, clock);
                Ok(task.clone())
            })
            .await?;
        Ok(task)
    }

    /// Merges regenerated tasks into the stored collection in one atomic
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when loading or saving fails.
    pub async fn merge_generated(
        &self,
        unit: ReviewUnit,
        regenerated: Vec<Task>,
    ) -> TaskLifecycleResult<MergeReport> {
        self.merge_generated_excluding(unit, regenerated, &HashSet::new())
            .await
    }

    /// Merges regenerated tasks while treating `already_claimed` as taken.
    ///
    /// Used by runs that merge in several steps; see
    /// [`merge_tasks_excluding`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when loading or saving fails.
    #[instrument(
        skip(self, regenerated, already_claimed),
        fields(review_unit = %unit, incoming = regenerated.len(), claimed = already_claimed.len())
    )]
    pub async fn merge_generated_excluding(
        &self,
        unit: ReviewUnit,
        regenerated: Vec<Task>,
        already_claimed: &HashSet<TaskId>,
    ) -> TaskLifecycleResult<MergeReport> {
        let clock = &*self.clock;
        let threshold = self.merge_threshold;
        let report = self
            .store
            .modify(unit, move |tasks| {
                let MergeOutcome {
                    tasks: merged,
                    report,
                } = merge_tasks_excluding(
                    std::mem::take(tasks),
                    regenerated,
                    threshold,
                    clock,
                    already_claimed,
                );
                *tasks = merged;
                Ok(report)
            })
            .await?;
        info!(
            added = report.added.len(),
            refreshed = report.refreshed.len(),
            unchanged = report.unchanged,
            orphaned = report.orphaned.len(),
            "merged generated tasks"
        );
        Ok(report)
    }
}

fn siblings_of(tasks: &[Task], comment_id: CommentId) -> Vec<Task> {
    if comment_id.is_synthetic() {
        return Vec::new();
    }
    tasks
        .iter()
        .filter(|task| task.source_comment_id() == comment_id)
        .cloned()
        .collect()
}
