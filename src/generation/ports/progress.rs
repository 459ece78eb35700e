//! Progress reporting port.

use crate::task::domain::Task;

/// Receives progress notifications during a run.
///
/// Callbacks run synchronously on the orchestrating task and must return
/// promptly.
pub trait ProgressObserver: Send + Sync {
    /// Called after each comment is accounted for.
    fn on_progress(&self, _processed: usize, _total: usize) {}

    /// Called after a batch's tasks have been persisted.
    fn on_batch_complete(&self, _batch_index: usize, _tasks: &[Task]) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
