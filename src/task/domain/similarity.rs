//! Normalized text similarity used for deduplication and synthetic-task
//! matching.
//!
//! Text is normalized by lowercasing, treating every non-alphanumeric
//! character as a separator, and collapsing whitespace. Similarity is the
//! Jaccard overlap of the resulting token sets, compared against a whole
//! percentage threshold with integer arithmetic. Identical normalized text
//! always matches.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Normalizes text for comparison.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|ch| {
            if ch.is_alphanumeric() {
                ch.to_lowercase().next().unwrap_or(ch)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Minimum overlap, in percent, for two texts to count as similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SimilarityThreshold(u8);

impl SimilarityThreshold {
    /// Default threshold of 80%.
    pub const DEFAULT: Self = Self(80);

    /// Creates a threshold.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidSimilarityThreshold`] unless
    /// `1 <= percent <= 100`.
    pub const fn new(percent: u8) -> Result<Self, TaskDomainError> {
        if percent == 0 || percent > 100 {
            return Err(TaskDomainError::InvalidSimilarityThreshold(percent));
        }
        Ok(Self(percent))
    }

    /// Returns the threshold in percent.
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }
}

impl Default for SimilarityThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for SimilarityThreshold {
    type Error = TaskDomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SimilarityThreshold> for u8 {
    fn from(value: SimilarityThreshold) -> Self {
        value.0
    }
}

/// Token overlap between two normalized texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSimilarity {
    shared_tokens: usize,
    total_tokens: usize,
    identical: bool,
}

impl TextSimilarity {
    /// Measures the similarity of two raw texts.
    #[must_use]
    pub fn between(left: &str, right: &str) -> Self {
        Self::between_normalized(&normalize_text(left), &normalize_text(right))
    }

    /// Measures the similarity of two already normalized texts.
    #[must_use]
    pub fn between_normalized(left: &str, right: &str) -> Self {
        let left_tokens: HashSet<&str> = left.split(' ').filter(|t| !t.is_empty()).collect();
        let right_tokens: HashSet<&str> = right.split(' ').filter(|t| !t.is_empty()).collect();
        Self {
            shared_tokens: left_tokens.intersection(&right_tokens).count(),
            total_tokens: left_tokens.union(&right_tokens).count(),
            identical: !left.is_empty() && left == right,
        }
    }

    /// Returns `true` when the normalized texts are identical.
    #[must_use]
    pub const fn is_identical(self) -> bool {
        self.identical
    }

    /// Returns `true` when the overlap reaches the threshold.
    #[must_use]
    pub fn meets(self, threshold: SimilarityThreshold) -> bool {
        if self.identical {
            return true;
        }
        if self.total_tokens == 0 {
            return false;
        }
        let scaled_shared = self.shared_tokens.saturating_mul(100);
        let required = self.total_tokens.saturating_mul(usize::from(threshold.0));
        scaled_shared >= required
    }
}
