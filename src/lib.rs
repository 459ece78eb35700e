//! reviewtask: durable task tracking for pull-request review feedback.
//!
//! Review comments are turned into individually trackable tasks by an
//! external analyzer, in bounded and resumable batches. Regenerating tasks
//! never discards progress recorded by operators, and the task list is
//! reconciled against the remote review to show which comments still need
//! work.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (files, memory, channels)
//! - **Services**: Orchestration over ports
//!
//! # Modules
//!
//! - [`review`]: Review comments, the remote host, and thread reconciliation
//! - [`task`]: Task lifecycle, merging, and persistence
//! - [`generation`]: Batch task synthesis with resume and time budgets
//! - [`config`]: Configuration loading
//! - [`storage`]: Capability-scoped atomic JSON documents

pub mod config;
pub mod generation;
pub mod review;
pub mod storage;
pub mod task;

#[cfg(test)]
mod test_support;
