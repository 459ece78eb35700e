//! Review feedback tracking for reviewtask.
//!
//! This module models the remote review state that tasks are derived from:
//! review comments, their threads, and the classification of each comment
//! against the locally tracked task list. It follows the same hexagonal
//! layout as the task module:
//!
//! - Domain types and the thread reconciler in [`domain`]
//! - Remote host and local cache contracts in [`ports`]
//! - In-memory and file-backed implementations in [`adapters`]
//! - Sync and status-reporting services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
