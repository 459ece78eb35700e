//! Cancellation with remote thread notification.

use super::{TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService};
use crate::review::domain::ReviewUnit;
use crate::review::ports::ReviewHost;
use crate::task::domain::{Task, TaskDomainError, TaskId, TaskStatus};
use crate::task::ports::TaskStore;
use minijinja::{Environment, context};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Default template for the reply posted to a cancelled task's thread.
pub const DEFAULT_CANCEL_REPLY_TEMPLATE: &str =
    "Task cancelled: {{ description }}\n\nReason: {{ reason }}";

/// What happened to the remote notification of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteNotification {
    /// The reason was posted by this call.
    Posted,
    /// The reason had already been posted; nothing was sent.
    AlreadyPosted,
    /// The task is synthetic and has no remote thread.
    NotApplicable,
    /// Posting failed; the local cancellation stays committed.
    Failed(String),
}

/// Result of cancelling one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    /// Task after cancellation and notification.
    pub task: Task,
    /// What happened remotely.
    pub notification: RemoteNotification,
}

/// Cancels tasks and tells the review thread why.
///
/// The local cancellation is always committed first. A failed reply leaves
/// the posted flag unset so that [`Self::retry_pending_notifications`] can
/// deliver it later.
pub struct TaskCancellationService<S, H, C>
where
    S: TaskStore,
    H: ReviewHost,
    C: Clock + Send + Sync,
{
    lifecycle: TaskLifecycleService<S, C>,
    host: Arc<H>,
    reply_template: String,
}

impl<S, H, C> TaskCancellationService<S, H, C>
where
    S: TaskStore,
    H: ReviewHost,
    C: Clock + Send + Sync,
{
    /// Creates a cancellation service using the default reply template.
    #[must_use]
    pub fn new(lifecycle: TaskLifecycleService<S, C>, host: Arc<H>) -> Self {
        Self {
            lifecycle,
            host,
            reply_template: DEFAULT_CANCEL_REPLY_TEMPLATE.to_owned(),
        }
    }

    /// Replaces the reply template.
    ///
    /// The template sees `task_id`, `description`, `reason`, `comment_id`,
    /// and `review_unit`.
    #[must_use]
    pub fn with_reply_template(mut self, template: impl Into<String>) -> Self {
        self.reply_template = template.into();
        self
    }

    /// Cancels one task and posts the reason to its thread.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCancelReason`] for a blank reason,
    /// a not-found store error for an unknown ID, and
    /// [`TaskDomainError::InvalidStatusTransition`] for a `done` task.
    /// Remote failures are reported in [`CancelOutcome::notification`].
    #[instrument(skip(self, reason), fields(review_unit = %unit, task_id = %id))]
    pub async fn cancel(
        &self,
        unit: ReviewUnit,
        id: TaskId,
        reason: &str,
    ) -> TaskLifecycleResult<CancelOutcome> {
        let task = self.lifecycle.cancel(unit, id, reason).await?;
        self.notify(unit, task).await
    }

    /// Cancels several tasks with one reason.
    ///
    /// The reason is validated once up front. Each task then succeeds or
    /// fails on its own; one failure never stops the others.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCancelReason`] before touching any
    /// task when the reason is blank.
    pub async fn cancel_many(
        &self,
        unit: ReviewUnit,
        ids: &[TaskId],
        reason: &str,
    ) -> TaskLifecycleResult<Vec<(TaskId, TaskLifecycleResult<CancelOutcome>)>> {
        if reason.trim().is_empty() {
            return Err(TaskLifecycleError::Domain(
                TaskDomainError::EmptyCancelReason,
            ));
        }
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let outcome = self.cancel(unit, *id, reason).await;
            if let Err(err) = &outcome {
                warn!(task_id = %id, error = %err, "cancellation failed");
            }
            outcomes.push((*id, outcome));
        }
        Ok(outcomes)
    }

    /// Re-posts reasons for cancelled tasks whose notification never
    /// reached the remote thread.
    ///
    /// # Errors
    ///
    /// Returns a store error when the tasks cannot be loaded.
    #[instrument(skip(self), fields(review_unit = %unit))]
    pub async fn retry_pending_notifications(
        &self,
        unit: ReviewUnit,
    ) -> TaskLifecycleResult<Vec<CancelOutcome>> {
        let pending: Vec<Task> = self
            .lifecycle
            .load(unit)
            .await?
            .into_iter()
            .filter(|task| {
                task.status() == TaskStatus::Cancel
                    && !task.cancel_comment_posted()
                    && !task.source_comment_id().is_synthetic()
            })
            .collect();
        info!(pending = pending.len(), "retrying cancellation notifications");
        let mut outcomes = Vec::with_capacity(pending.len());
        for task in pending {
            outcomes.push(self.notify(unit, task).await?);
        }
        Ok(outcomes)
    }

    async fn notify(&self, unit: ReviewUnit, task: Task) -> TaskLifecycleResult<CancelOutcome> {
        if task.source_comment_id().is_synthetic() {
            return Ok(CancelOutcome {
                task,
                notification: RemoteNotification::NotApplicable,
            });
        }
        if task.cancel_comment_posted() {
            return Ok(CancelOutcome {
                task,
                notification: RemoteNotification::AlreadyPosted,
            });
        }
        let Some(reason) = task.cancel_reason().map(ToOwned::to_owned) else {
            return Err(TaskLifecycleError::Domain(TaskDomainError::NotCancelled(
                task.id(),
            )));
        };

        let body = match self.render_reply(unit, &task, &reason) {
            Ok(body) => body,
            Err(failure) => return Ok(Self::failed(task, failure)),
        };
        if let Err(err) = self
            .host
            .post_reply(unit, task.source_comment_id(), &body)
            .await
        {
            return Ok(Self::failed(task, err.to_string()));
        }

        let posted = self
            .lifecycle
            .mark_cancel_reply_posted(unit, task.id(), &reason)
            .await?;
        Ok(CancelOutcome {
            task: posted,
            notification: RemoteNotification::Posted,
        })
    }

    fn failed(task: Task, reason: String) -> CancelOutcome {
        warn!(task_id = %task.id(), %reason, "cancellation reply not posted; will retry later");
        CancelOutcome {
            task,
            notification: RemoteNotification::Failed(reason),
        }
    }

    fn render_reply(&self, unit: ReviewUnit, task: &Task, reason: &str) -> Result<String, String> {
        Environment::new()
            .render_str(
                &self.reply_template,
                context! {
                    task_id => task.id().to_string(),
                    description => task.description(),
                    reason => reason,
                    comment_id => task.source_comment_id().value(),
                    review_unit => unit.number(),
                },
            )
            .map_err(|err| format!("failed to render cancellation reply: {err}"))
    }
}
