//! External analysis capability port.

use crate::generation::domain::AnalysisOptions;
use crate::review::domain::ReviewComment;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for analyzer calls.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Turns a batch of review comments into structured task drafts.
///
/// Implementations are untrusted: their output is raw text that the
/// generator parses and validates before anything is persisted. One call is
/// made per batch, never per comment.
#[async_trait]
pub trait TaskAnalyzer: Send + Sync {
    /// Analyzes a batch and returns the raw structured output.
    async fn analyze(
        &self,
        batch: &[ReviewComment],
        options: &AnalysisOptions,
    ) -> AnalyzerResult<String>;
}

/// Errors from analyzer calls.
#[derive(Debug, Clone, Error)]
pub enum AnalyzerError {
    /// The call did not finish within the remaining time budget.
    #[error("analyzer call timed out")]
    TimedOut,

    /// The output could not be read as task drafts.
    #[error("analyzer output rejected: {0}")]
    MalformedOutput(String),

    /// The capability itself failed.
    #[error("analyzer call failed: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl AnalyzerError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
