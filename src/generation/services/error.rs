//! Errors surfaced by generation runs.

use crate::generation::domain::GenerationConfigError;
use crate::generation::ports::{AnalyzerError, CheckpointStoreError};
use crate::review::domain::ReviewUnit;
use crate::task::services::TaskLifecycleError;
use thiserror::Error;

/// Fatal run errors.
///
/// Timeouts are not errors; they end a run with
/// [`crate::generation::domain::RunStatus::TimedOut`]. Every variant raised
/// after batches started carries the number of comments this invocation
/// processed, whose tasks stay persisted.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The configuration was rejected before any batch ran.
    #[error(transparent)]
    Config(#[from] GenerationConfigError),

    /// The analyzer kept failing for a batch.
    #[error(
        "generation failed for batch {batch_index} after {attempts} attempt(s) \
         ({processed_comments} comment(s) processed): {source}"
    )]
    GenerationFailed {
        /// Zero-based index of the failed batch.
        batch_index: usize,
        /// Analyzer calls made for the batch.
        attempts: u32,
        /// Comments processed by this invocation before the failure.
        processed_comments: usize,
        /// Last analyzer error.
        #[source]
        source: AnalyzerError,
    },

    /// Tasks could not be merged into the store.
    #[error("failed to persist tasks ({processed_comments} comment(s) processed): {source}")]
    Persistence {
        /// Comments processed by this invocation before the failure.
        processed_comments: usize,
        /// Underlying store error.
        #[source]
        source: TaskLifecycleError,
    },

    /// The run checkpoint could not be read or written.
    #[error("checkpoint failure ({processed_comments} comment(s) processed): {source}")]
    Checkpoint {
        /// Comments processed by this invocation before the failure.
        processed_comments: usize,
        /// Underlying checkpoint store error.
        #[source]
        source: CheckpointStoreError,
    },

    /// A background run for the review unit is already active.
    #[error("a generation run for review unit {0} is already active")]
    AlreadyRunning(ReviewUnit),

    /// The background worker running the pass failed.
    #[error("background generation worker failed: {0}")]
    Worker(String),
}

impl GenerationError {
    /// Returns the comments processed before the failure, when batches had
    /// started.
    #[must_use]
    pub const fn processed_comments(&self) -> Option<usize> {
        match self {
            Self::GenerationFailed {
                processed_comments, ..
            }
            | Self::Persistence {
                processed_comments, ..
            }
            | Self::Checkpoint {
                processed_comments, ..
            } => Some(*processed_comments),
            Self::Config(_) | Self::AlreadyRunning(_) | Self::Worker(_) => None,
        }
    }
}
