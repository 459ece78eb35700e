//! Batch synthesis of tasks from review comments.
//!
//! Comments are cut into fixed-size batches, each batch is sent to an
//! external analyzer once, and the validated, deduplicated drafts are merged
//! into the task store. Runs are bounded by a batch limit and a wall-clock
//! budget, and can resume from a checkpoint in a later invocation.
//!
//! - Configuration, scheduling, and draft validation in [`domain`]
//! - Analyzer, checkpoint, and progress contracts in [`ports`]
//! - Scripted, in-memory, file, and channel implementations in [`adapters`]
//! - Generator, orchestrator, and background runner in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
