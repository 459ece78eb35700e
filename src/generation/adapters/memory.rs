//! In-memory analyzer and checkpoint store.

use crate::generation::{
    domain::{AnalysisOptions, RunCheckpoint},
    ports::{
        AnalyzerError, AnalyzerResult, CheckpointStore, CheckpointStoreError,
        CheckpointStoreResult, TaskAnalyzer,
    },
};
use crate::review::domain::{CommentId, ReviewComment, ReviewUnit};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

fn scripted_error(message: impl Into<String>) -> AnalyzerError {
    AnalyzerError::backend(std::io::Error::other(message.into()))
}

/// Analyzer replaying scripted responses.
///
/// Responses are consumed in order, one per call. When the script runs out,
/// an echoing analyzer answers with one draft per comment whose description
/// is the comment body; otherwise the call fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTaskAnalyzer {
    script: Arc<Mutex<VecDeque<AnalyzerResult<String>>>>,
    calls: Arc<Mutex<Vec<Vec<CommentId>>>>,
    echo: bool,
}

impl ScriptedTaskAnalyzer {
    /// Creates an analyzer with an empty script that fails once exhausted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an analyzer that echoes comment bodies once its script is
    /// exhausted.
    #[must_use]
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Appends a raw response to the script.
    pub fn push_response(&self, raw: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(raw.into()));
        }
    }

    /// Appends a failure to the script.
    pub fn push_failure(&self, error: AnalyzerError) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(error));
        }
    }

    /// Returns the comment IDs of every batch analyzed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<CommentId>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn echo_response(batch: &[ReviewComment]) -> String {
        let drafts: Vec<_> = batch
            .iter()
            .map(|comment| {
                json!({
                    "description": comment.body(),
                    "source_comment_id": comment.id().value(),
                    "priority": "medium",
                })
            })
            .collect();
        serde_json::Value::Array(drafts).to_string()
    }
}

#[async_trait]
impl TaskAnalyzer for ScriptedTaskAnalyzer {
    async fn analyze(
        &self,
        batch: &[ReviewComment],
        _options: &AnalysisOptions,
    ) -> AnalyzerResult<String> {
        self.calls
            .lock()
            .map_err(|err| scripted_error(err.to_string()))?
            .push(batch.iter().map(ReviewComment::id).collect());
        let next = self
            .script
            .lock()
            .map_err(|err| scripted_error(err.to_string()))?
            .pop_front();
        match next {
            Some(response) => response,
            None if self.echo => Ok(Self::echo_response(batch)),
            None => Err(scripted_error("analyzer script exhausted")),
        }
    }
}

/// In-memory checkpoint store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    checkpoints: Arc<RwLock<HashMap<ReviewUnit, RunCheckpoint>>>,
}

impl InMemoryCheckpointStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> CheckpointStoreError {
    CheckpointStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, unit: ReviewUnit) -> CheckpointStoreResult<Option<RunCheckpoint>> {
        let checkpoints = self.checkpoints.read().map_err(lock_error)?;
        Ok(checkpoints.get(&unit).cloned())
    }

    async fn save(&self, checkpoint: &RunCheckpoint) -> CheckpointStoreResult<()> {
        let mut checkpoints = self.checkpoints.write().map_err(lock_error)?;
        checkpoints.insert(checkpoint.review_unit, checkpoint.clone());
        Ok(())
    }

    async fn clear(&self, unit: ReviewUnit) -> CheckpointStoreResult<()> {
        let mut checkpoints = self.checkpoints.write().map_err(lock_error)?;
        checkpoints.remove(&unit);
        Ok(())
    }
}
