//! Port contracts for review feedback access.
//!
//! Ports define infrastructure-agnostic interfaces used by review and task
//! services.

pub mod cache;
pub mod host;

pub use cache::{ReviewCache, ReviewCacheError, ReviewCacheResult};
pub use host::{ReviewHost, ReviewHostError, ReviewHostResult};
