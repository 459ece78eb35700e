//! Identifier types for review units, reviews, and comments.

use super::ReviewDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pull request (or equivalent) whose feedback is being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewUnit(u64);

impl ReviewUnit {
    const NAME_PREFIX: &'static str = "PR-";

    /// Creates a validated review unit.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::InvalidReviewUnit`] when the value is zero.
    pub const fn new(number: u64) -> Result<Self, ReviewDomainError> {
        if number == 0 {
            return Err(ReviewDomainError::InvalidReviewUnit(number));
        }
        Ok(Self(number))
    }

    /// Returns the pull request number.
    #[must_use]
    pub const fn number(self) -> u64 {
        self.0
    }

    /// Returns the storage name for this unit, e.g. `PR-42`.
    #[must_use]
    pub fn storage_name(self) -> String {
        format!("{}{}", Self::NAME_PREFIX, self.0)
    }

    /// Parses a storage name produced by [`Self::storage_name`].
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::UnrecognisedReviewUnitName`] when the name
    /// does not follow the `PR-<number>` pattern, or
    /// [`ReviewDomainError::InvalidReviewUnit`] for `PR-0`.
    pub fn from_storage_name(name: &str) -> Result<Self, ReviewDomainError> {
        let number = name
            .strip_prefix(Self::NAME_PREFIX)
            .and_then(|digits| digits.parse::<u64>().ok())
            .ok_or_else(|| ReviewDomainError::UnrecognisedReviewUnitName(name.to_owned()))?;
        Self::new(number)
    }
}

impl fmt::Display for ReviewUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a submitted review on the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(u64);

impl ReviewId {
    /// Wraps a remote review identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a review comment, and therefore of its thread.
///
/// The zero value is reserved for synthetic sources (for example review
/// summaries without an inline comment); such tasks have no remote thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(u64);

impl CommentId {
    /// Identifier used for tasks that do not originate from a remote thread.
    pub const SYNTHETIC: Self = Self(0);

    /// Wraps a remote comment identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` when this identifier does not refer to a remote thread.
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
