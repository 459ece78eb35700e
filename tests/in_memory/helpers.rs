//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use reviewtask::{
    generation::{
        adapters::{InMemoryCheckpointStore, ScriptedTaskAnalyzer},
        domain::{AnalysisOptions, GenerationConfig},
        services::GenerationOrchestrator,
    },
    review::{
        adapters::InMemoryReviewHost,
        domain::{CommentId, ReviewComment, ReviewId, ReviewUnit},
    },
    task::{adapters::memory::InMemoryTaskStore, services::TaskLifecycleService},
};
use rstest::fixture;

/// Lifecycle service type shared by the in-memory tests.
pub type TestLifecycle = TaskLifecycleService<InMemoryTaskStore, DefaultClock>;

/// Orchestrator type shared by the in-memory tests.
pub type TestOrchestrator = GenerationOrchestrator<
    ScriptedTaskAnalyzer,
    InMemoryTaskStore,
    InMemoryCheckpointStore,
    DefaultClock,
>;

/// Review unit used throughout the in-memory tests.
#[fixture]
pub fn unit() -> ReviewUnit {
    ReviewUnit::new(42).expect("non-zero review unit")
}

/// Builds an unresolved review comment attached to `src/lib.rs`.
#[must_use]
pub fn review_comment(id: u64, body: &str) -> ReviewComment {
    ReviewComment::new(CommentId::new(id), ReviewId::new(7), body)
        .with_location("src/lib.rs", Some(u32::try_from(id).unwrap_or(1)))
        .with_author("reviewer")
}

/// Builds up to eight unrelated review comments numbered from 1.
#[must_use]
pub fn review_comments(count: usize) -> Vec<ReviewComment> {
    const BODIES: [&str; 8] = [
        "Handle the parser error instead of panicking",
        "Back off exponentially in the retry loop",
        "Rename the cache helper to say what it caches",
        "Add a regression test for empty input",
        "Avoid copying buffers inside the encoder",
        "Log request identifiers when a call fails",
        "Acquire registry locks in a fixed order",
        "Document every public builder method",
    ];
    BODIES
        .iter()
        .take(count)
        .zip(1_u64..)
        .map(|(body, id)| review_comment(id, body))
        .collect()
}

/// In-memory components wired together the way a caller would wire them.
pub struct Workspace {
    /// Shared task store.
    pub store: Arc<InMemoryTaskStore>,
    /// Fake review host.
    pub host: Arc<InMemoryReviewHost>,
    /// Scripted analyzer echoing comment bodies.
    pub analyzer: Arc<ScriptedTaskAnalyzer>,
    /// Generation checkpoints.
    pub checkpoints: Arc<InMemoryCheckpointStore>,
}

impl Workspace {
    /// Creates a workspace whose analyzer echoes every comment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryTaskStore::new()),
            host: Arc::new(InMemoryReviewHost::new()),
            analyzer: Arc::new(ScriptedTaskAnalyzer::echo()),
            checkpoints: Arc::new(InMemoryCheckpointStore::new()),
        }
    }

    /// Returns a lifecycle service over the shared store.
    #[must_use]
    pub fn lifecycle(&self) -> TestLifecycle {
        TaskLifecycleService::new(Arc::clone(&self.store), Arc::new(DefaultClock))
    }

    /// Returns an orchestrator over the shared store and checkpoints.
    #[must_use]
    pub fn orchestrator(&self, config: GenerationConfig) -> TestOrchestrator {
        GenerationOrchestrator::new(
            Arc::clone(&self.analyzer),
            self.lifecycle(),
            Arc::clone(&self.checkpoints),
            Arc::new(DefaultClock),
            config,
            AnalysisOptions::default(),
        )
        .expect("valid generation config")
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides a fresh workspace for each test.
#[fixture]
pub fn workspace() -> Workspace {
    Workspace::new()
}

/// Generation settings with the given batching and no time budget.
#[must_use]
pub fn batching(batch_size: usize, max_batches: usize) -> GenerationConfig {
    GenerationConfig {
        batch_size,
        max_batches,
        max_timeout_secs: 0,
        ..GenerationConfig::default()
    }
}
