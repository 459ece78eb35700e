//! Per-run progress, checkpoints, and results.

use crate::review::domain::{ReviewComment, ReviewUnit};
use crate::task::domain::Task;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fingerprints an ordered comment list.
///
/// Two lists share a fingerprint only when they hold the same comments, in
/// the same order, with the same bodies.
#[must_use]
pub fn fingerprint_comments(comments: &[ReviewComment]) -> String {
    let mut hasher = Sha256::new();
    for comment in comments {
        hasher.update(comment.id().value().to_string().as_bytes());
        hasher.update([0_u8]);
        hasher.update(comment.body().as_bytes());
        hasher.update([0_u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Persisted record of completed batches, enabling resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCheckpoint {
    /// Review unit the run belongs to.
    pub review_unit: ReviewUnit,
    /// Number of leading batches fully processed and persisted.
    pub completed_batches: usize,
    /// Size of the comment list the batches were cut from.
    pub total_comments: usize,
    /// Batch size the batches were cut with.
    pub batch_size: usize,
    /// Fingerprint of the comment list.
    pub fingerprint: String,
    /// When the checkpoint was written.
    pub updated_at: DateTime<Utc>,
}

impl RunCheckpoint {
    /// Returns `true` when the checkpoint was cut from the same input with
    /// the same batch size.
    #[must_use]
    pub fn applies_to(
        &self,
        unit: ReviewUnit,
        fingerprint: &str,
        total_comments: usize,
        batch_size: usize,
    ) -> bool {
        self.review_unit == unit
            && self.fingerprint == fingerprint
            && self.total_comments == total_comments
            && self.batch_size == batch_size
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every batch has been processed.
    Completed,
    /// The batch limit was reached; another invocation should resume.
    MoreRemaining {
        /// Index of the first unprocessed batch.
        next_batch: usize,
        /// Comments not yet processed.
        remaining_comments: usize,
    },
    /// The time budget ran out; completed work is persisted.
    TimedOut {
        /// Index of the first unprocessed batch.
        next_batch: usize,
        /// Comments not yet processed.
        remaining_comments: usize,
    },
}

impl RunStatus {
    /// Returns `true` when resuming would make further progress.
    #[must_use]
    pub const fn should_resume(self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// Mutable state of one orchestrator run.
#[derive(Debug, Clone)]
pub struct RunState {
    total_comments: usize,
    completed_batches: usize,
    processed_comments: usize,
    processed_this_run: usize,
    batches_this_run: usize,
    tasks: Vec<Task>,
    started_at: DateTime<Utc>,
    elapsed: TimeDelta,
    timed_out: bool,
}

impl RunState {
    /// Starts a run, possibly after `completed_batches` resumed batches
    /// covering `processed_comments` comments.
    #[must_use]
    pub const fn new(
        total_comments: usize,
        completed_batches: usize,
        processed_comments: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_comments,
            completed_batches,
            processed_comments,
            processed_this_run: 0,
            batches_this_run: 0,
            tasks: Vec::new(),
            started_at,
            elapsed: TimeDelta::zero(),
            timed_out: false,
        }
    }

    /// Counts one more processed comment and returns the running total.
    pub const fn advance_comment(&mut self) -> usize {
        self.processed_comments = self.processed_comments.saturating_add(1);
        self.processed_this_run = self.processed_this_run.saturating_add(1);
        self.processed_comments
    }

    /// Records a completed batch and the tasks it produced.
    pub fn complete_batch(&mut self, index: usize, tasks: &[Task]) {
        self.completed_batches = index.saturating_add(1);
        self.batches_this_run = self.batches_this_run.saturating_add(1);
        self.tasks.extend_from_slice(tasks);
    }

    /// Updates the elapsed time and returns it.
    pub fn observe_time(&mut self, now: DateTime<Utc>) -> TimeDelta {
        self.elapsed = now.signed_duration_since(self.started_at);
        self.elapsed
    }

    /// Marks the run as stopped by its time budget.
    pub const fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    /// Returns the number of leading batches completed, including resumed
    /// ones.
    #[must_use]
    pub const fn completed_batches(&self) -> usize {
        self.completed_batches
    }

    /// Returns the number of comments processed by this invocation.
    #[must_use]
    pub const fn processed_this_run(&self) -> usize {
        self.processed_this_run
    }

    /// Returns the number of batches processed by this invocation.
    #[must_use]
    pub const fn batches_this_run(&self) -> usize {
        self.batches_this_run
    }

    /// Returns the total number of comments in the run.
    #[must_use]
    pub const fn total_comments(&self) -> usize {
        self.total_comments
    }

    /// Returns the tasks generated by this invocation.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the time spent so far.
    #[must_use]
    pub const fn elapsed(&self) -> TimeDelta {
        self.elapsed
    }

    /// Derives the final status from the progress made.
    #[must_use]
    pub const fn status(&self, total_batches: usize) -> RunStatus {
        let remaining_comments = self.total_comments.saturating_sub(self.processed_comments);
        if self.completed_batches >= total_batches {
            RunStatus::Completed
        } else if self.timed_out {
            RunStatus::TimedOut {
                next_batch: self.completed_batches,
                remaining_comments,
            }
        } else {
            RunStatus::MoreRemaining {
                next_batch: self.completed_batches,
                remaining_comments,
            }
        }
    }
}

/// Summary of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Review unit the run belonged to.
    pub review_unit: ReviewUnit,
    /// How the run ended.
    pub status: RunStatus,
    /// Batch the run started from; non-zero after a resume.
    pub started_at_batch: usize,
    /// Batches processed by this invocation.
    pub batches_processed: usize,
    /// Comments processed by this invocation.
    pub comments_processed: usize,
    /// Comments in the whole run.
    pub total_comments: usize,
    /// Tasks accepted by this invocation.
    pub tasks_generated: usize,
    /// Stored tasks appended by merges.
    pub tasks_added: usize,
    /// Stored tasks whose content was refreshed by merges.
    pub tasks_refreshed: usize,
    /// Drafts dropped as near-duplicates.
    pub duplicates_dropped: usize,
    /// Drafts rejected by validation.
    pub drafts_rejected: usize,
    /// Wall-clock time spent.
    pub elapsed: TimeDelta,
}
