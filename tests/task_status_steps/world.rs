//! Shared world state for task status BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use reviewtask::{
    review::{
        adapters::InMemoryReviewHost,
        domain::{ReviewComment, ReviewUnit},
    },
    task::{
        adapters::memory::InMemoryTaskStore,
        domain::{Task, TaskId},
        services::{TaskCancellationService, TaskLifecycleError, TaskLifecycleService},
    },
};
use rstest::fixture;

/// Lifecycle service type used by the BDD world.
pub type TestLifecycle = TaskLifecycleService<InMemoryTaskStore, DefaultClock>;

/// Scenario world for task status behaviour tests.
pub struct TaskStatusWorld {
    pub unit: ReviewUnit,
    pub store: Arc<InMemoryTaskStore>,
    pub host: Arc<InMemoryReviewHost>,
    pub comments: Vec<ReviewComment>,
    pub last_update: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskStatusWorld {
    /// Creates a world with an empty store and host.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unit: ReviewUnit::new(11).expect("non-zero review unit"),
            store: Arc::new(InMemoryTaskStore::new()),
            host: Arc::new(InMemoryReviewHost::new()),
            comments: Vec::new(),
            last_update: None,
        }
    }

    /// Returns a lifecycle service over the shared store.
    #[must_use]
    pub fn lifecycle(&self) -> TestLifecycle {
        TaskLifecycleService::new(Arc::clone(&self.store), Arc::new(DefaultClock))
    }

    /// Returns a cancellation service over the shared store and host.
    #[must_use]
    pub fn cancellation(
        &self,
    ) -> TaskCancellationService<InMemoryTaskStore, InMemoryReviewHost, DefaultClock> {
        TaskCancellationService::new(self.lifecycle(), Arc::clone(&self.host))
    }

    /// Resolves a one-based task position to the stored task's ID.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read or has no task at
    /// that position.
    pub fn task_id(&self, position: usize) -> Result<TaskId, eyre::Report> {
        let tasks = run_async(self.lifecycle().load(self.unit))?;
        position
            .checked_sub(1)
            .and_then(|index| tasks.get(index))
            .map(Task::id)
            .ok_or_else(|| eyre::eyre!("no task at position {position}"))
    }
}

impl Default for TaskStatusWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskStatusWorld {
    TaskStatusWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
