//! Run configuration for task generation.

use crate::task::domain::SimilarityThreshold;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;

/// Default number of comments sent to the analyzer per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default number of retries after a failed analyzer call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wall-clock budget for one run, in seconds.
pub const DEFAULT_MAX_TIMEOUT_SECS: u64 = 600;

/// Invalid generation settings, rejected before any batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationConfigError {
    /// Batches must hold at least one comment.
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    /// The timeout does not fit in a time span.
    #[error("timeout of {0} seconds is out of range")]
    TimeoutOutOfRange(u64),
}

/// Deduplication of drafts within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeduplicationConfig {
    /// Whether near-duplicate drafts are dropped.
    pub enabled: bool,
    /// Minimum description overlap for two drafts to be duplicates.
    pub threshold: SimilarityThreshold,
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: SimilarityThreshold::DEFAULT,
        }
    }
}

/// Settings for one generation run.
///
/// Passed explicitly to the orchestrator; nothing here is process-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Comments per analyzer call. Must be non-zero.
    pub batch_size: usize,
    /// Batches processed per invocation; `0` means unlimited.
    pub max_batches: usize,
    /// Continue after the last checkpointed batch when possible.
    pub resume: bool,
    /// Wall-clock budget for the run in seconds; `0` disables the budget.
    pub max_timeout_secs: u64,
    /// Persist each accepted task immediately instead of per batch.
    pub realtime_save: bool,
    /// Retries after a failed analyzer call before the batch fails.
    pub max_retries: u32,
    /// Leave comments on resolved threads out of the run.
    pub skip_resolved: bool,
    /// Draft deduplication.
    pub deduplication: DeduplicationConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_batches: 0,
            resume: true,
            max_timeout_secs: DEFAULT_MAX_TIMEOUT_SECS,
            realtime_save: false,
            max_retries: DEFAULT_MAX_RETRIES,
            skip_resolved: true,
            deduplication: DeduplicationConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationConfigError::ZeroBatchSize`] for a zero batch
    /// size and [`GenerationConfigError::TimeoutOutOfRange`] for a timeout
    /// too large to represent.
    pub fn validate(&self) -> Result<(), GenerationConfigError> {
        self.non_zero_batch_size()?;
        self.time_budget()?;
        Ok(())
    }

    /// Returns the batch size as a non-zero count.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationConfigError::ZeroBatchSize`] when zero.
    pub const fn non_zero_batch_size(&self) -> Result<NonZeroUsize, GenerationConfigError> {
        match NonZeroUsize::new(self.batch_size) {
            Some(size) => Ok(size),
            None => Err(GenerationConfigError::ZeroBatchSize),
        }
    }

    /// Returns the wall-clock budget, or `None` when unlimited.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationConfigError::TimeoutOutOfRange`] when the
    /// configured seconds cannot be represented.
    pub fn time_budget(&self) -> Result<Option<TimeDelta>, GenerationConfigError> {
        if self.max_timeout_secs == 0 {
            return Ok(None);
        }
        i64::try_from(self.max_timeout_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .map(Some)
            .ok_or(GenerationConfigError::TimeoutOutOfRange(
                self.max_timeout_secs,
            ))
    }
}

/// Language and formatting hints forwarded to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Natural language the task descriptions should be written in.
    pub language: String,
    /// Free-form instructions appended to every analyzer request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_instructions: Option<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            language: "English".to_owned(),
            extra_instructions: None,
        }
    }
}
