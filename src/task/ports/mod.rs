//! Port contracts for task persistence and status side effects.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod hook;
pub mod store;

pub use hook::{SideEffectOutcome, StatusChange, StatusChangeHook};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult, ensure_unique_identities};
