//! Orchestration services for batch task generation.

mod background;
mod error;
mod generator;
mod orchestrator;

pub use background::BackgroundRunner;
pub use error::GenerationError;
pub use generator::{BatchError, GeneratedBatch, TaskGenerator};
pub use orchestrator::GenerationOrchestrator;
