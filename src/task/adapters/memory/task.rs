//! In-memory task store for task lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::review::domain::ReviewUnit;
use crate::task::{
    domain::Task,
    ports::{TaskStore, TaskStoreError, TaskStoreResult, ensure_unique_identities},
};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<HashMap<ReviewUnit, Vec<Task>>>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn load(&self, unit: ReviewUnit) -> TaskStoreResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.get(&unit).cloned().unwrap_or_default())
    }

    async fn save(&self, unit: ReviewUnit, tasks: &[Task]) -> TaskStoreResult<()> {
        ensure_unique_identities(tasks)?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.insert(unit, tasks.to_vec());
        Ok(())
    }

    async fn modify<T, F>(&self, unit: ReviewUnit, mutation: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut Vec<Task>) -> TaskStoreResult<T> + Send,
        T: Send,
    {
        let mut state = self.state.write().map_err(lock_error)?;
        // Work on a copy so a failed mutation leaves the stored collection intact.
        let mut working = state.get(&unit).cloned().unwrap_or_default();
        let output = mutation(&mut working)?;
        ensure_unique_identities(&working)?;
        state.insert(unit, working);
        Ok(output)
    }

    async fn review_units(&self) -> TaskStoreResult<Vec<ReviewUnit>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut units: Vec<_> = state.keys().copied().collect();
        units.sort();
        Ok(units)
    }
}
