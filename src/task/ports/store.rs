//! Store port for per-review-unit task collections.

use crate::review::domain::ReviewUnit;
use crate::task::domain::{Task, TaskDomainError, TaskId, TaskKey};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
///
/// A store holds one ordered task collection per review unit. Every write is
/// atomic at collection granularity: a concurrent or subsequent reader sees
/// either the previous collection or the complete new one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Loads the task collection for a review unit; empty when none exists.
    async fn load(&self, unit: ReviewUnit) -> TaskStoreResult<Vec<Task>>;

    /// Replaces the task collection for a review unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] or
    /// [`TaskStoreError::DuplicateTaskKey`] when the collection violates task
    /// identity invariants; nothing is written in that case.
    async fn save(&self, unit: ReviewUnit, tasks: &[Task]) -> TaskStoreResult<()>;

    /// Applies a read-modify-write mutation atomically.
    ///
    /// The mutation sees the current collection. When it returns `Ok` and the
    /// result satisfies the identity invariants, the modified collection is
    /// committed; otherwise the stored collection is left unchanged.
    async fn modify<T, F>(&self, unit: ReviewUnit, mutation: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut Vec<Task>) -> TaskStoreResult<T> + Send,
        T: Send;

    /// Lists review units that have a stored collection.
    async fn review_units(&self) -> TaskStoreResult<Vec<ReviewUnit>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// No task with the given identifier exists in the collection.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Two tasks share an identifier.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Two tasks share a source comment and task index.
    #[error("duplicate task for {0}")]
    DuplicateTaskKey(TaskKey),

    /// A mutation was rejected by domain rules.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Checks that task identifiers and merge keys are unique.
///
/// # Errors
///
/// Returns the first duplicate found.
pub fn ensure_unique_identities(tasks: &[Task]) -> TaskStoreResult<()> {
    let mut ids = HashSet::with_capacity(tasks.len());
    let mut keys = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !ids.insert(task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        if let Some(key) = task.key()
            && !keys.insert(key)
        {
            return Err(TaskStoreError::DuplicateTaskKey(key));
        }
    }
    Ok(())
}
