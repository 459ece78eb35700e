//! Background generation passes, at most one per review unit.

use super::{GenerationError, GenerationOrchestrator};
use crate::generation::{
    domain::RunReport,
    ports::{CheckpointStore, ProgressObserver, TaskAnalyzer},
};
use crate::review::domain::{ReviewComment, ReviewUnit};
use crate::task::ports::TaskStore;
use mockable::Clock;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span};

/// Releases a review unit's slot when its pass ends, however it ends.
struct ActiveRun {
    unit: ReviewUnit,
    active: Arc<Mutex<HashSet<ReviewUnit>>>,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.remove(&self.unit);
    }
}

/// Runs orchestrator passes on tokio tasks.
///
/// A second pass for a review unit that already has one running is
/// refused rather than queued.
pub struct BackgroundRunner<A, S, K, C>
where
    A: TaskAnalyzer + 'static,
    S: TaskStore + 'static,
    K: CheckpointStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    orchestrator: Arc<GenerationOrchestrator<A, S, K, C>>,
    active: Arc<Mutex<HashSet<ReviewUnit>>>,
}

impl<A, S, K, C> Clone for BackgroundRunner<A, S, K, C>
where
    A: TaskAnalyzer + 'static,
    S: TaskStore + 'static,
    K: CheckpointStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            active: Arc::clone(&self.active),
        }
    }
}

impl<A, S, K, C> BackgroundRunner<A, S, K, C>
where
    A: TaskAnalyzer + 'static,
    S: TaskStore + 'static,
    K: CheckpointStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a runner around a shared orchestrator.
    #[must_use]
    pub fn new(orchestrator: Arc<GenerationOrchestrator<A, S, K, C>>) -> Self {
        Self {
            orchestrator,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns `true` while a pass for `unit` is running.
    #[must_use]
    pub fn is_running(&self, unit: ReviewUnit) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&unit)
    }

    /// Starts a pass and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::AlreadyRunning`] when a pass for `unit` is
    /// still active.
    pub fn spawn(
        &self,
        unit: ReviewUnit,
        comments: Vec<ReviewComment>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<JoinHandle<Result<RunReport, GenerationError>>, GenerationError> {
        let guard = {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if !active.insert(unit) {
                return Err(GenerationError::AlreadyRunning(unit));
            }
            ActiveRun {
                unit,
                active: Arc::clone(&self.active),
            }
        };
        let orchestrator = Arc::clone(&self.orchestrator);
        info!(review_unit = %unit, "background generation started");
        let pass = async move {
            let _slot = guard;
            orchestrator.run(unit, &comments, observer.as_ref()).await
        };
        Ok(tokio::spawn(
            pass.instrument(info_span!("background_generation", review_unit = %unit)),
        ))
    }

    /// Waits for a spawned pass.
    ///
    /// # Errors
    ///
    /// Returns the pass's own error, or [`GenerationError::Worker`] when the
    /// task panicked or was cancelled.
    pub async fn join(
        handle: JoinHandle<Result<RunReport, GenerationError>>,
    ) -> Result<RunReport, GenerationError> {
        handle
            .await
            .map_err(|err| GenerationError::Worker(err.to_string()))?
    }
}
