//! Resumable generation runs over a review unit's comments.

use super::{BatchError, GenerationError, TaskGenerator};
use crate::generation::{
    domain::{
        AnalysisOptions, BatchSchedule, BatchWindow, Deduplicator, GenerationConfig,
        GenerationConfigError, RunCheckpoint, RunReport, RunState, RunStatus,
        fingerprint_comments,
    },
    ports::{CheckpointStore, CheckpointStoreError, ProgressObserver, TaskAnalyzer},
};
use crate::review::domain::{ReviewComment, ReviewUnit};
use crate::task::{
    domain::{MergeReport, Task, TaskId},
    ports::TaskStore,
    services::{TaskLifecycleError, TaskLifecycleService},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchStep {
    Done,
    TimedOut,
}

struct RunContext<'a> {
    unit: ReviewUnit,
    pending: &'a [ReviewComment],
    fingerprint: &'a str,
    batch_size: NonZeroUsize,
    deadline: Option<DateTime<Utc>>,
    state: RunState,
    dedup: Deduplicator,
    merged: MergeTotals,
    rejected: usize,
    observer: &'a dyn ProgressObserver,
}

#[derive(Debug, Default)]
struct MergeTotals {
    added: usize,
    refreshed: usize,
    claimed: HashSet<TaskId>,
}

impl MergeTotals {
    fn absorb(&mut self, report: &MergeReport) {
        self.added = self.added.saturating_add(report.added.len());
        self.refreshed = self.refreshed.saturating_add(report.refreshed.len());
        self.claimed.extend(report.added.iter().chain(&report.matched).copied());
    }
}

/// Drives the scheduler, generator, merger, and store through one run.
///
/// Batches run strictly in order: a batch's tasks are persisted and its
/// checkpoint written before the next batch starts.
pub struct GenerationOrchestrator<A, S, K, C>
where
    A: TaskAnalyzer,
    S: TaskStore,
    K: CheckpointStore,
    C: Clock + Send + Sync,
{
    generator: TaskGenerator<A, C>,
    lifecycle: TaskLifecycleService<S, C>,
    checkpoints: Arc<K>,
    clock: Arc<C>,
    config: GenerationConfig,
}

impl<A, S, K, C> GenerationOrchestrator<A, S, K, C>
where
    A: TaskAnalyzer,
    S: TaskStore,
    K: CheckpointStore,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationConfigError`] when `config` is invalid; nothing
    /// has run at that point.
    pub fn new(
        analyzer: Arc<A>,
        lifecycle: TaskLifecycleService<S, C>,
        checkpoints: Arc<K>,
        clock: Arc<C>,
        config: GenerationConfig,
        options: AnalysisOptions,
    ) -> Result<Self, GenerationConfigError> {
        config.validate()?;
        let generator =
            TaskGenerator::new(analyzer, Arc::clone(&clock), options, config.max_retries);
        Ok(Self {
            generator,
            lifecycle: lifecycle.with_merge_threshold(config.deduplication.threshold),
            checkpoints,
            clock,
            config,
        })
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Returns the lifecycle service tasks are merged through.
    #[must_use]
    pub const fn lifecycle(&self) -> &TaskLifecycleService<S, C> {
        &self.lifecycle
    }

    /// Runs generation over `comments` for one review unit.
    ///
    /// With resume enabled, a checkpoint cut from the same comments and
    /// batch size moves the start past the batches it records. The run stops
    /// at the batch limit or when the time budget is spent; either way the
    /// report says whether to resume. A completed run clears the checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the configuration is invalid, the
    /// analyzer fails a batch beyond its retries, or persistence fails.
    /// Tasks from batches finished before the error stay persisted.
    #[instrument(skip(self, comments, observer), fields(review_unit = %unit, comments = comments.len()))]
    pub async fn run(
        &self,
        unit: ReviewUnit,
        comments: &[ReviewComment],
        observer: &dyn ProgressObserver,
    ) -> Result<RunReport, GenerationError> {
        let batch_size = self.config.non_zero_batch_size()?;
        let budget = self.config.time_budget()?;
        let pending: Vec<ReviewComment> = comments
            .iter()
            .filter(|comment| !(self.config.skip_resolved && comment.is_resolved()))
            .cloned()
            .collect();
        let total = pending.len();
        let fingerprint = fingerprint_comments(&pending);
        let start_batch = self
            .resume_point(unit, &fingerprint, total, batch_size)
            .await?;

        let schedule = BatchSchedule::new(total, batch_size, start_batch, self.config.max_batches);
        let total_batches = schedule.total_batches();
        let started_at = self.clock.utc();
        let mut run = RunContext {
            unit,
            pending: &pending,
            fingerprint: &fingerprint,
            batch_size,
            deadline: budget.and_then(|limit| started_at.checked_add_signed(limit)),
            state: RunState::new(
                total,
                start_batch,
                schedule.comments_in_first(start_batch),
                started_at,
            ),
            dedup: Deduplicator::new(self.config.deduplication),
            merged: MergeTotals::default(),
            rejected: 0,
            observer,
        };
        info!(total, total_batches, start_batch, "generation run started");

        for window in schedule {
            if self.run_batch(&mut run, window).await? == BatchStep::TimedOut {
                run.state.mark_timed_out();
                break;
            }
        }

        let RunContext {
            mut state,
            dedup,
            merged,
            rejected,
            ..
        } = run;
        state.observe_time(self.clock.utc());
        let status = state.status(total_batches);
        if status == RunStatus::Completed {
            self.checkpoints
                .clear(unit)
                .await
                .map_err(|source| GenerationError::Checkpoint {
                    processed_comments: state.processed_this_run(),
                    source,
                })?;
        }
        info!(?status, processed = state.processed_this_run(), "generation run finished");

        Ok(RunReport {
            review_unit: unit,
            status,
            started_at_batch: start_batch,
            batches_processed: state.batches_this_run(),
            comments_processed: state.processed_this_run(),
            total_comments: total,
            tasks_generated: state.tasks().len(),
            tasks_added: merged.added,
            tasks_refreshed: merged.refreshed,
            duplicates_dropped: dedup.dropped(),
            drafts_rejected: rejected,
            elapsed: state.elapsed(),
        })
    }

    async fn run_batch(
        &self,
        run: &mut RunContext<'_>,
        window: BatchWindow,
    ) -> Result<BatchStep, GenerationError> {
        let now = self.clock.utc();
        run.state.observe_time(now);
        if run.deadline.is_some_and(|limit| now >= limit) {
            warn!(batch = window.index, "time budget spent before batch");
            return Ok(BatchStep::TimedOut);
        }
        debug!(batch = window.index, comments = window.len(), "processing batch");
        let batch = run.pending.get(window.range.clone()).unwrap_or_default();
        let generated = match self
            .generator
            .generate(run.unit, batch, &mut run.dedup, run.deadline)
            .await
        {
            Ok(generated) => generated,
            Err(BatchError::TimedOut) => {
                warn!(batch = window.index, "time budget spent during batch");
                return Ok(BatchStep::TimedOut);
            }
            Err(BatchError::Failed { attempts, source }) => {
                warn!(batch = window.index, attempts, error = %source, "batch failed");
                return Err(GenerationError::GenerationFailed {
                    batch_index: window.index,
                    attempts,
                    processed_comments: run.state.processed_this_run(),
                    source,
                });
            }
        };
        run.rejected = run.rejected.saturating_add(generated.rejected);

        self.persist(run.unit, &generated.tasks, &mut run.merged)
            .await
            .map_err(|source| GenerationError::Persistence {
                processed_comments: run.state.processed_this_run(),
                source,
            })?;
        let total = run.state.total_comments();
        for _ in window.range {
            let processed = run.state.advance_comment();
            run.observer.on_progress(processed, total);
        }
        run.state.complete_batch(window.index, &generated.tasks);
        self.save_checkpoint(run.unit, &run.state, run.batch_size, run.fingerprint)
            .await
            .map_err(|source| GenerationError::Checkpoint {
                processed_comments: run.state.processed_this_run(),
                source,
            })?;
        run.observer.on_batch_complete(window.index, &generated.tasks);
        info!(
            batch = window.index,
            tasks = generated.tasks.len(),
            duplicates = generated.duplicates_dropped,
            "batch complete"
        );
        Ok(BatchStep::Done)
    }

    async fn resume_point(
        &self,
        unit: ReviewUnit,
        fingerprint: &str,
        total: usize,
        batch_size: NonZeroUsize,
    ) -> Result<usize, GenerationError> {
        if !self.config.resume {
            return Ok(0);
        }
        let loaded = self
            .checkpoints
            .load(unit)
            .await
            .map_err(|source| GenerationError::Checkpoint {
                processed_comments: 0,
                source,
            })?;
        let Some(checkpoint) = loaded else {
            return Ok(0);
        };
        if checkpoint.applies_to(unit, fingerprint, total, batch_size.get()) {
            info!(
                completed_batches = checkpoint.completed_batches,
                "resuming from checkpoint"
            );
            Ok(checkpoint.completed_batches)
        } else {
            warn!("checkpoint does not match current comments or batch size; starting over");
            Ok(0)
        }
    }

    async fn persist(
        &self,
        unit: ReviewUnit,
        tasks: &[Task],
        merged: &mut MergeTotals,
    ) -> Result<(), TaskLifecycleError> {
        if self.config.realtime_save {
            for task in tasks {
                let report = self
                    .lifecycle
                    .merge_generated_excluding(unit, vec![task.clone()], &merged.claimed)
                    .await?;
                merged.absorb(&report);
            }
        } else if !tasks.is_empty() {
            let report = self
                .lifecycle
                .merge_generated_excluding(unit, tasks.to_vec(), &merged.claimed)
                .await?;
            merged.absorb(&report);
        }
        Ok(())
    }

    async fn save_checkpoint(
        &self,
        unit: ReviewUnit,
        state: &RunState,
        batch_size: NonZeroUsize,
        fingerprint: &str,
    ) -> Result<(), CheckpointStoreError> {
        self.checkpoints
            .save(&RunCheckpoint {
                review_unit: unit,
                completed_batches: state.completed_batches(),
                total_comments: state.total_comments(),
                batch_size: batch_size.get(),
                fingerprint: fingerprint.to_owned(),
                updated_at: self.clock.utc(),
            })
            .await
    }
}
