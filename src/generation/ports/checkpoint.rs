//! Persistence port for run checkpoints.

use crate::generation::domain::RunCheckpoint;
use crate::review::domain::ReviewUnit;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for checkpoint store operations.
pub type CheckpointStoreResult<T> = Result<T, CheckpointStoreError>;

/// Stores at most one checkpoint per review unit.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Loads the checkpoint, if any.
    async fn load(&self, unit: ReviewUnit) -> CheckpointStoreResult<Option<RunCheckpoint>>;

    /// Replaces the checkpoint.
    async fn save(&self, checkpoint: &RunCheckpoint) -> CheckpointStoreResult<()>;

    /// Removes the checkpoint; a missing checkpoint is not an error.
    async fn clear(&self, unit: ReviewUnit) -> CheckpointStoreResult<()>;
}

/// Errors returned by checkpoint stores.
#[derive(Debug, Clone, Error)]
pub enum CheckpointStoreError {
    /// Persistence-layer failure.
    #[error("checkpoint persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CheckpointStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
