//! Task aggregate root.

use super::{
    ImplementationStatus, Priority, TaskDomainError, TaskId, TaskKey, TaskStatus,
    VerificationResult, VerificationStatus,
};
use crate::review::domain::{CommentId, ReviewId, ReviewUnit};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Identity and content of a task about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Review unit the task belongs to.
    pub review_unit: ReviewUnit,
    /// Review the source comment belongs to.
    pub source_review_id: ReviewId,
    /// Source comment, or [`CommentId::SYNTHETIC`].
    pub source_comment_id: CommentId,
    /// Position among the tasks derived from the source comment.
    pub task_index: u32,
    /// Actionable description.
    pub description: String,
    /// Snapshot of the feedback text the task was derived from.
    pub origin_text: String,
    /// Priority.
    pub priority: Priority,
    /// File the task concerns, if any.
    pub file_path: Option<String>,
    /// Line the task concerns, if any.
    pub line: Option<u32>,
}

/// Tracked unit of work derived from review feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    review_unit: ReviewUnit,
    source_review_id: ReviewId,
    source_comment_id: CommentId,
    task_index: u32,
    description: String,
    origin_text: String,
    priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    status: TaskStatus,
    #[serde(default)]
    implementation_status: ImplementationStatus,
    #[serde(default)]
    verification_status: VerificationStatus,
    #[serde(default)]
    verification_results: Vec<VerificationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cancel_reason: Option<String>,
    #[serde(default)]
    cancel_comment_posted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_verified_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new `todo` task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the description is
    /// blank.
    pub fn new(content: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let description = content.description.trim();
        if description.is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            review_unit: content.review_unit,
            source_review_id: content.source_review_id,
            source_comment_id: content.source_comment_id,
            task_index: content.task_index,
            description: description.to_owned(),
            origin_text: content.origin_text,
            priority: content.priority,
            file_path: content.file_path,
            line: content.line,
            status: TaskStatus::Todo,
            implementation_status: ImplementationStatus::NotImplemented,
            verification_status: VerificationStatus::NotVerified,
            verification_results: Vec::new(),
            cancel_reason: None,
            cancel_comment_posted: false,
            created_at: timestamp,
            updated_at: timestamp,
            last_verified_at: None,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the review unit.
    #[must_use]
    pub const fn review_unit(&self) -> ReviewUnit {
        self.review_unit
    }

    /// Returns the source review identifier.
    #[must_use]
    pub const fn source_review_id(&self) -> ReviewId {
        self.source_review_id
    }

    /// Returns the source comment identifier.
    #[must_use]
    pub const fn source_comment_id(&self) -> CommentId {
        self.source_comment_id
    }

    /// Returns the index among tasks derived from the same comment.
    #[must_use]
    pub const fn task_index(&self) -> u32 {
        self.task_index
    }

    /// Returns the merge key, or `None` for synthetic tasks.
    #[must_use]
    pub const fn key(&self) -> Option<TaskKey> {
        if self.source_comment_id.is_synthetic() {
            return None;
        }
        Some(TaskKey {
            comment_id: self.source_comment_id,
            task_index: self.task_index,
        })
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the origin-text snapshot.
    #[must_use]
    pub fn origin_text(&self) -> &str {
        &self.origin_text
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the file path, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Returns the line, if any.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the implementation status.
    #[must_use]
    pub const fn implementation_status(&self) -> ImplementationStatus {
        self.implementation_status
    }

    /// Returns the verification status.
    #[must_use]
    pub const fn verification_status(&self) -> VerificationStatus {
        self.verification_status
    }

    /// Returns the verification history, oldest first.
    #[must_use]
    pub fn verification_results(&self) -> &[VerificationResult] {
        &self.verification_results
    }

    /// Returns the cancellation reason, if cancelled.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// Returns `true` when the cancellation reason was posted remotely.
    #[must_use]
    pub const fn cancel_comment_posted(&self) -> bool {
        self.cancel_comment_posted
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the latest verification timestamp.
    #[must_use]
    pub const fn last_verified_at(&self) -> Option<DateTime<Utc>> {
        self.last_verified_at
    }

    /// Moves the task to a new status through the generic status path.
    ///
    /// Setting the current status again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CancelRequiresReason`] when `target` is
    /// [`TaskStatus::Cancel`], and
    /// [`TaskDomainError::InvalidStatusTransition`] when the transition is not
    /// permitted.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if target == TaskStatus::Cancel {
            return Err(TaskDomainError::CancelRequiresReason(self.id));
        }
        if target == self.status {
            return Ok(());
        }
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        if target == TaskStatus::Todo {
            self.cancel_reason = None;
            self.cancel_comment_posted = false;
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Cancels the task with a reason.
    ///
    /// Cancelling an already cancelled task with the same reason changes
    /// nothing; a different reason replaces the old one and clears the
    /// posted flag so the new reason is communicated again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCancelReason`] for a blank reason and
    /// [`TaskDomainError::InvalidStatusTransition`] when the task is `done`.
    pub fn cancel(&mut self, reason: &str, clock: &impl Clock) -> Result<(), TaskDomainError> {
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyCancelReason);
        }
        if self.status == TaskStatus::Cancel {
            if self.cancel_reason.as_deref() == Some(trimmed) {
                return Ok(());
            }
        } else if !self.status.can_transition_to(TaskStatus::Cancel) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: TaskStatus::Cancel,
            });
        }
        self.status = TaskStatus::Cancel;
        self.cancel_reason = Some(trimmed.to_owned());
        self.cancel_comment_posted = false;
        self.touch(clock);
        Ok(())
    }

    /// Records whether the cancellation reason reached the remote thread.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotCancelled`] when the task is not
    /// cancelled.
    pub fn set_cancel_comment_posted(
        &mut self,
        posted: bool,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::Cancel {
            return Err(TaskDomainError::NotCancelled(self.id));
        }
        if self.cancel_comment_posted != posted {
            self.cancel_comment_posted = posted;
            self.touch(clock);
        }
        Ok(())
    }

    /// Marks the reply for `posted_reason` as delivered.
    ///
    /// Returns `false` and changes nothing when the task is no longer
    /// cancelled or its reason differs from the one that was posted.
    pub fn mark_cancel_reply_posted(&mut self, posted_reason: &str, clock: &impl Clock) -> bool {
        let current = self
            .cancel_reason
            .as_deref()
            .filter(|_| self.status == TaskStatus::Cancel);
        if current != Some(posted_reason.trim()) {
            return false;
        }
        if !self.cancel_comment_posted {
            self.cancel_comment_posted = true;
            self.touch(clock);
        }
        true
    }

    /// Records the implementation status.
    pub fn set_implementation_status(&mut self, status: ImplementationStatus, clock: &impl Clock) {
        if self.implementation_status != status {
            self.implementation_status = status;
            self.touch(clock);
        }
    }

    /// Appends a verification result and updates the verification status.
    pub fn record_verification(&mut self, result: VerificationResult, clock: &impl Clock) {
        self.verification_status = if result.success {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Failed
        };
        self.last_verified_at = Some(result.timestamp);
        self.verification_results.push(result);
        self.touch(clock);
    }

    /// Replaces content fields with those of a regenerated task.
    ///
    /// Identity and lifecycle fields are untouched. Returns `true` when any
    /// content field changed.
    pub fn refresh_content_from(&mut self, regenerated: &Self, clock: &impl Clock) -> bool {
        let changed = self.description != regenerated.description
            || self.origin_text != regenerated.origin_text
            || self.priority != regenerated.priority
            || self.file_path != regenerated.file_path
            || self.line != regenerated.line;
        if changed {
            self.description.clone_from(&regenerated.description);
            self.origin_text.clone_from(&regenerated.origin_text);
            self.priority = regenerated.priority;
            self.file_path.clone_from(&regenerated.file_path);
            self.line = regenerated.line;
            self.touch(clock);
        }
        changed
    }

    /// Clears all lifecycle state, leaving a fresh `todo` task.
    pub(crate) fn restart_lifecycle(&mut self) {
        self.status = TaskStatus::Todo;
        self.implementation_status = ImplementationStatus::NotImplemented;
        self.verification_status = VerificationStatus::NotVerified;
        self.verification_results.clear();
        self.cancel_reason = None;
        self.cancel_comment_posted = false;
        self.last_verified_at = None;
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
