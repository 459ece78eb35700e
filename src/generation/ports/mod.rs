//! Port contracts for task generation.

pub mod analyzer;
pub mod checkpoint;
pub mod progress;

pub use analyzer::{AnalyzerError, AnalyzerResult, TaskAnalyzer};
pub use checkpoint::{CheckpointStore, CheckpointStoreError, CheckpointStoreResult};
pub use progress::{NoopObserver, ProgressObserver};
