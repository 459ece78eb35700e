//! Progress observer forwarding notifications over a tokio channel.

use crate::generation::ports::ProgressObserver;
use crate::task::domain::{Task, TaskId};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

/// Notification sent by [`ChannelProgressObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A comment was accounted for.
    Progress {
        /// Comments processed so far.
        processed: usize,
        /// Comments in the run.
        total: usize,
    },
    /// A batch was persisted.
    BatchComplete {
        /// Zero-based batch index.
        batch_index: usize,
        /// Tasks generated by the batch.
        task_ids: Vec<TaskId>,
    },
}

/// Observer that never blocks: events go to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelProgressObserver {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelProgressObserver {
    /// Creates an observer and the receiver its events arrive on.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            debug!("progress receiver dropped; event discarded");
        }
    }
}

impl ProgressObserver for ChannelProgressObserver {
    fn on_progress(&self, processed: usize, total: usize) {
        self.send(ProgressEvent::Progress { processed, total });
    }

    fn on_batch_complete(&self, batch_index: usize, tasks: &[Task]) {
        self.send(ProgressEvent::BatchComplete {
            batch_index,
            task_ids: tasks.iter().map(Task::id).collect(),
        });
    }
}
