//! Shared world state for batch generation BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use reviewtask::{
    generation::{
        adapters::{InMemoryCheckpointStore, ScriptedTaskAnalyzer},
        domain::{AnalysisOptions, GenerationConfig, RunReport},
        services::{GenerationError, GenerationOrchestrator},
    },
    review::domain::{CommentId, ReviewComment, ReviewId, ReviewUnit},
    task::{adapters::memory::InMemoryTaskStore, services::TaskLifecycleService},
};
use rstest::fixture;

/// Comment bodies handed out in order by the Given steps.
const BODIES: [&str; 6] = [
    "Return early when the buffer is empty",
    "Replace the manual loop with an iterator chain",
    "Explain why the timeout is doubled",
    "Move the retry constants into configuration",
    "Reject negative offsets in the seek helper",
    "Keep the public error type non-exhaustive",
];

/// Scenario world for batch generation behaviour tests.
pub struct GenerationWorld {
    pub unit: ReviewUnit,
    pub store: Arc<InMemoryTaskStore>,
    pub checkpoints: Arc<InMemoryCheckpointStore>,
    pub analyzer: Arc<ScriptedTaskAnalyzer>,
    pub comments: Vec<ReviewComment>,
    pub config: GenerationConfig,
    pub last_run: Option<Result<RunReport, GenerationError>>,
}

impl GenerationWorld {
    /// Creates a world with no comments and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unit: ReviewUnit::new(21).expect("non-zero review unit"),
            store: Arc::new(InMemoryTaskStore::new()),
            checkpoints: Arc::new(InMemoryCheckpointStore::new()),
            analyzer: Arc::new(ScriptedTaskAnalyzer::echo()),
            comments: Vec::new(),
            config: GenerationConfig {
                max_timeout_secs: 0,
                ..GenerationConfig::default()
            },
            last_run: None,
        }
    }

    /// Replaces the comments with the first `count` canned bodies.
    ///
    /// # Errors
    ///
    /// Returns an error when more comments are requested than are canned.
    pub fn seed_comments(&mut self, count: usize) -> Result<(), eyre::Report> {
        if count > BODIES.len() {
            return Err(eyre::eyre!(
                "at most {} canned comments are available",
                BODIES.len()
            ));
        }
        self.comments = BODIES
            .iter()
            .take(count)
            .zip(1_u64..)
            .map(|(body, id)| Self::comment(id, body))
            .collect();
        Ok(())
    }

    /// Appends a comment with the next free identifier.
    pub fn push_comment(&mut self, body: &str) {
        let next = self
            .comments
            .iter()
            .map(|comment| comment.id().value())
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        self.comments.push(Self::comment(next, body));
    }

    fn comment(id: u64, body: &str) -> ReviewComment {
        ReviewComment::new(CommentId::new(id), ReviewId::new(9), body)
            .with_location("src/io.rs", Some(12))
    }

    /// Returns a lifecycle service over the shared store.
    #[must_use]
    pub fn lifecycle(&self) -> TaskLifecycleService<InMemoryTaskStore, DefaultClock> {
        TaskLifecycleService::new(Arc::clone(&self.store), Arc::new(DefaultClock))
    }

    /// Builds an orchestrator for the current settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings are invalid.
    pub fn orchestrator(
        &self,
    ) -> Result<
        GenerationOrchestrator<
            ScriptedTaskAnalyzer,
            InMemoryTaskStore,
            InMemoryCheckpointStore,
            DefaultClock,
        >,
        eyre::Report,
    > {
        Ok(GenerationOrchestrator::new(
            Arc::clone(&self.analyzer),
            self.lifecycle(),
            Arc::clone(&self.checkpoints),
            Arc::new(DefaultClock),
            self.config.clone(),
            AnalysisOptions::default(),
        )?)
    }

    /// Returns the report of the last run.
    ///
    /// # Errors
    ///
    /// Returns an error when no run happened or the last run failed.
    pub fn last_report(&self) -> Result<&RunReport, eyre::Report> {
        match self.last_run.as_ref() {
            Some(Ok(report)) => Ok(report),
            Some(Err(err)) => Err(eyre::eyre!("last run failed: {err}")),
            None => Err(eyre::eyre!("no generation run happened")),
        }
    }
}

impl Default for GenerationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> GenerationWorld {
    GenerationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
