//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The cancellation reason is empty after trimming.
    #[error("cancellation reason must not be empty")]
    EmptyCancelReason,

    /// Cancellation was requested through the generic status path.
    #[error("task {0} can only be cancelled with a reason")]
    CancelRequiresReason(TaskId),

    /// The requested status transition is not permitted.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A cancellation-only field was updated on a task that is not cancelled.
    #[error("task {0} is not cancelled")]
    NotCancelled(TaskId),

    /// A task identifier could not be parsed.
    #[error("invalid task identifier: {0}")]
    InvalidTaskId(String),

    /// A similarity threshold is outside `1..=100`.
    #[error("invalid similarity threshold {0}, expected a percentage between 1 and 100")]
    InvalidSimilarityThreshold(u8),
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);
