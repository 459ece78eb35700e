//! Adapter implementations for review host and cache ports.

pub mod file;
pub mod memory;

pub use file::FileReviewCache;
pub use memory::{InMemoryReviewCache, InMemoryReviewHost, PostedReply};
