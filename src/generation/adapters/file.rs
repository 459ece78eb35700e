//! File-backed checkpoint store.

use crate::generation::{
    domain::RunCheckpoint,
    ports::{CheckpointStore, CheckpointStoreError, CheckpointStoreResult},
};
use crate::review::domain::ReviewUnit;
use crate::storage::DocumentStore;
use async_trait::async_trait;
use camino::Utf8PathBuf;

const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Checkpoints persisted as `<root>/PR-<n>/checkpoint.json`.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    documents: DocumentStore,
}

impl FileCheckpointStore {
    /// Creates a checkpoint store backed by the given document store.
    #[must_use]
    pub const fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }

    fn path_for(unit: ReviewUnit) -> Utf8PathBuf {
        Utf8PathBuf::from(unit.storage_name()).join(CHECKPOINT_FILE)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, unit: ReviewUnit) -> CheckpointStoreResult<Option<RunCheckpoint>> {
        self.documents
            .read_json(Self::path_for(unit))
            .await
            .map_err(CheckpointStoreError::persistence)
    }

    async fn save(&self, checkpoint: &RunCheckpoint) -> CheckpointStoreResult<()> {
        self.documents
            .write_json(Self::path_for(checkpoint.review_unit), checkpoint)
            .await
            .map_err(CheckpointStoreError::persistence)
    }

    async fn clear(&self, unit: ReviewUnit) -> CheckpointStoreResult<()> {
        self.documents
            .remove(Self::path_for(unit))
            .await
            .map_err(CheckpointStoreError::persistence)
    }
}
