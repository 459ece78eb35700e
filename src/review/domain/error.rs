//! Error types for review domain validation.

use thiserror::Error;

/// Errors returned while constructing review domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewDomainError {
    /// The review unit number is invalid.
    #[error("invalid review unit {0}, expected a positive pull request number")]
    InvalidReviewUnit(u64),

    /// A review unit directory name could not be parsed.
    #[error("unrecognised review unit name: {0}")]
    UnrecognisedReviewUnitName(String),
}
