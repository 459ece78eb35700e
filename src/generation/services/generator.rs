//! Per-batch task generation with bounded retries.

use crate::generation::{
    domain::{AnalysisOptions, Deduplicator, ParsedDrafts, ValidatedDraft, parse_analyzer_output},
    ports::{AnalyzerError, AnalyzerResult, TaskAnalyzer},
};
use crate::review::domain::{CommentId, ReviewComment, ReviewUnit};
use crate::task::domain::Task;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tasks produced for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedBatch {
    /// Accepted tasks, in analyzer order.
    pub tasks: Vec<Task>,
    /// Drafts dropped as near-duplicates of earlier drafts in the run.
    pub duplicates_dropped: usize,
    /// Drafts rejected by validation, including undecodable entries.
    pub rejected: usize,
    /// Analyzer calls made.
    pub attempts: u32,
}

/// Why a batch produced no tasks.
#[derive(Debug, Clone)]
pub enum BatchError {
    /// The time budget ran out before the analyzer answered.
    TimedOut,
    /// Every allowed attempt failed.
    Failed {
        /// Analyzer calls made.
        attempts: u32,
        /// Error from the last attempt.
        source: AnalyzerError,
    },
}

/// Calls the analyzer once per batch and turns its output into tasks.
pub struct TaskGenerator<A, C>
where
    A: TaskAnalyzer,
    C: Clock + Send + Sync,
{
    analyzer: Arc<A>,
    clock: Arc<C>,
    options: AnalysisOptions,
    max_retries: u32,
}

impl<A, C> TaskGenerator<A, C>
where
    A: TaskAnalyzer,
    C: Clock + Send + Sync,
{
    /// Creates a generator allowing `max_retries` retries per batch.
    #[must_use]
    pub const fn new(
        analyzer: Arc<A>,
        clock: Arc<C>,
        options: AnalysisOptions,
        max_retries: u32,
    ) -> Self {
        Self {
            analyzer,
            clock,
            options,
            max_retries,
        }
    }

    /// Generates tasks for one batch.
    ///
    /// Drafts are validated against the batch, deduplicated against
    /// everything `dedup` has accepted earlier in the run, and numbered per
    /// source comment in acceptance order. Only drafts that become tasks are
    /// offered to `dedup`. A `deadline` bounds every analyzer call by the
    /// time left.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::TimedOut`] when the deadline passes and
    /// [`BatchError::Failed`] when all attempts fail.
    pub async fn generate(
        &self,
        unit: ReviewUnit,
        batch: &[ReviewComment],
        dedup: &mut Deduplicator,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<GeneratedBatch, BatchError> {
        let (parsed, attempts) = self.call_with_retries(batch, deadline).await?;
        let dropped_before = dedup.dropped();
        let mut output = GeneratedBatch {
            rejected: parsed.malformed,
            attempts,
            ..GeneratedBatch::default()
        };
        let mut next_index: HashMap<CommentId, u32> = HashMap::new();

        for raw in parsed.drafts {
            let draft = match ValidatedDraft::from_raw(raw, batch) {
                Ok(draft) => draft,
                Err(reason) => {
                    debug!(%reason, "draft rejected");
                    output.rejected = output.rejected.saturating_add(1);
                    continue;
                }
            };
            let comment_id = draft.comment_id;
            let task_index = next_index.get(&comment_id).copied().unwrap_or(0);
            let task = match Task::new(draft.into_new_task(unit, task_index), &*self.clock) {
                Ok(task) => task,
                Err(err) => {
                    debug!(error = %err, "draft rejected by task rules");
                    output.rejected = output.rejected.saturating_add(1);
                    continue;
                }
            };
            if !dedup.admit(task.description()) {
                debug!(description = %task.description(), "duplicate draft dropped");
                continue;
            }
            next_index.insert(comment_id, task_index.saturating_add(1));
            output.tasks.push(task);
        }
        output.duplicates_dropped = dedup.dropped().saturating_sub(dropped_before);
        Ok(output)
    }

    async fn call_with_retries(
        &self,
        batch: &[ReviewComment],
        deadline: Option<DateTime<Utc>>,
    ) -> Result<(ParsedDrafts, u32), BatchError> {
        let allowed = self.max_retries.saturating_add(1);
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let error = match self.call_once(batch, deadline).await {
                Ok(parsed) => return Ok((parsed, attempt)),
                Err(AnalyzerError::TimedOut) => return Err(BatchError::TimedOut),
                Err(error) => error,
            };
            if attempt >= allowed {
                return Err(BatchError::Failed {
                    attempts: attempt,
                    source: error,
                });
            }
            warn!(attempt, allowed, %error, "analyzer call failed; retrying");
        }
    }

    async fn call_once(
        &self,
        batch: &[ReviewComment],
        deadline: Option<DateTime<Utc>>,
    ) -> AnalyzerResult<ParsedDrafts> {
        let raw = match deadline {
            None => self.analyzer.analyze(batch, &self.options).await?,
            Some(limit) => {
                let remaining = limit.signed_duration_since(self.clock.utc());
                if remaining <= TimeDelta::zero() {
                    return Err(AnalyzerError::TimedOut);
                }
                let budget = remaining.to_std().unwrap_or_default();
                match tokio::time::timeout(budget, self.analyzer.analyze(batch, &self.options))
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => return Err(AnalyzerError::TimedOut),
                }
            }
        };
        parse_analyzer_output(&raw).map_err(|err| AnalyzerError::MalformedOutput(err.to_string()))
    }
}
