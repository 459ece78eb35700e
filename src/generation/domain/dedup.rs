//! Run-wide draft deduplication.

use super::DeduplicationConfig;
use crate::task::domain::{SimilarityThreshold, TextSimilarity, normalize_text};

/// Remembers accepted descriptions and drops later near-duplicates.
///
/// The first draft wins; later drafts whose normalized description meets
/// the threshold against any accepted one are dropped and counted.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    enabled: bool,
    threshold: SimilarityThreshold,
    accepted: Vec<String>,
    dropped: usize,
}

impl Deduplicator {
    /// Creates an empty deduplicator.
    #[must_use]
    pub const fn new(config: DeduplicationConfig) -> Self {
        Self {
            enabled: config.enabled,
            threshold: config.threshold,
            accepted: Vec::new(),
            dropped: 0,
        }
    }

    /// Offers a description. Returns `true` when it is accepted.
    pub fn admit(&mut self, description: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let normalized = normalize_text(description);
        let duplicate = self.accepted.iter().any(|existing| {
            TextSimilarity::between_normalized(existing, &normalized).meets(self.threshold)
        });
        if duplicate {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        self.accepted.push(normalized);
        true
    }

    /// Returns how many drafts were dropped as duplicates.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }
}
