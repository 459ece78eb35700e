//! [`TaskStore`] implementation over JSON documents.

use super::document::{TASK_DOCUMENT_VERSION, TaskDocument};
use crate::review::domain::ReviewUnit;
use crate::storage::DocumentStore;
use crate::task::{
    domain::Task,
    ports::{TaskStore, TaskStoreError, TaskStoreResult, ensure_unique_identities},
};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const TASKS_FILE: &str = "tasks.json";

#[derive(Debug, Error)]
enum TaskDocumentError {
    #[error("unsupported task document version {found}, expected at most {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("task document for {found} stored under {expected}")]
    UnitMismatch {
        found: ReviewUnit,
        expected: ReviewUnit,
    },
}

/// Task store persisting one JSON document per review unit.
///
/// Read-modify-write cycles are serialized within the process; atomic
/// document replacement keeps readers in other processes from observing
/// partial writes.
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    documents: DocumentStore,
    write_lock: Arc<Mutex<()>>,
}

impl FileTaskStore {
    /// Creates a store backed by the given document store.
    #[must_use]
    pub fn new(documents: DocumentStore) -> Self {
        Self {
            documents,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn path_for(unit: ReviewUnit) -> Utf8PathBuf {
        Utf8PathBuf::from(unit.storage_name()).join(TASKS_FILE)
    }

    async fn read(&self, unit: ReviewUnit) -> TaskStoreResult<Vec<Task>> {
        let document: Option<TaskDocument> = self
            .documents
            .read_json(Self::path_for(unit))
            .await
            .map_err(TaskStoreError::persistence)?;
        let Some(doc) = document else {
            return Ok(Vec::new());
        };
        if doc.version > TASK_DOCUMENT_VERSION {
            return Err(TaskStoreError::persistence(
                TaskDocumentError::UnsupportedVersion {
                    found: doc.version,
                    supported: TASK_DOCUMENT_VERSION,
                },
            ));
        }
        if doc.review_unit != unit {
            return Err(TaskStoreError::persistence(TaskDocumentError::UnitMismatch {
                found: doc.review_unit,
                expected: unit,
            }));
        }
        Ok(doc.tasks)
    }

    async fn write(&self, unit: ReviewUnit, tasks: Vec<Task>) -> TaskStoreResult<()> {
        ensure_unique_identities(&tasks)?;
        let task_count = tasks.len();
        let document = TaskDocument::new(unit, tasks, Utc::now());
        self.documents
            .write_json(Self::path_for(unit), &document)
            .await
            .map_err(TaskStoreError::persistence)?;
        debug!(review_unit = %unit, task_count, "task document written");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn load(&self, unit: ReviewUnit) -> TaskStoreResult<Vec<Task>> {
        self.read(unit).await
    }

    #[instrument(skip(self, tasks), fields(review_unit = %unit, task_count = tasks.len()))]
    async fn save(&self, unit: ReviewUnit, tasks: &[Task]) -> TaskStoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write(unit, tasks.to_vec()).await
    }

    async fn modify<T, F>(&self, unit: ReviewUnit, mutation: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut Vec<Task>) -> TaskStoreResult<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut working = self.read(unit).await?;
        let output = mutation(&mut working)?;
        self.write(unit, working).await?;
        Ok(output)
    }

    async fn review_units(&self) -> TaskStoreResult<Vec<ReviewUnit>> {
        let names = self
            .documents
            .list_dirs()
            .await
            .map_err(TaskStoreError::persistence)?;
        let mut units = Vec::with_capacity(names.len());
        for name in names {
            match ReviewUnit::from_storage_name(&name) {
                Ok(unit) => units.push(unit),
                Err(err) => debug!(directory = %name, error = %err, "skipping non-review directory"),
            }
        }
        units.sort();
        Ok(units)
    }
}
