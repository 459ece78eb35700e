//! Unit tests for the task module.
//!
//! Tests are organised by concern: the status machine, task aggregate
//! rules, merging, similarity, stores, and the lifecycle and cancellation
//! services.
