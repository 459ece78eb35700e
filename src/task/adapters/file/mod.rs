//! File-backed task store.
//!
//! Each review unit gets a directory `PR-<n>` below the storage root holding
//! a `tasks.json` document. Writes go through
//! [`DocumentStore`](crate::storage::DocumentStore), which replaces the
//! document atomically.

mod document;
mod store;

pub use store::FileTaskStore;
