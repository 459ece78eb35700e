//! Task lifecycle management.
//!
//! Tasks are durable, individually trackable units of work derived from
//! review comments. This module owns the task aggregate and its status
//! machine, the merge that folds regenerated tasks into a persisted list
//! without losing operator progress, and the store contract with in-memory
//! and file-backed implementations. It follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
