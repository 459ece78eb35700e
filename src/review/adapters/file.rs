//! File-backed review comment cache.

use crate::review::{
    domain::{ReviewComment, ReviewUnit},
    ports::{ReviewCache, ReviewCacheError, ReviewCacheResult},
};
use crate::storage::DocumentStore;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const REVIEWS_FILE: &str = "reviews.json";

#[derive(Debug, Serialize, Deserialize)]
struct ReviewCacheDocument {
    fetched_at: Option<DateTime<Utc>>,
    comments: Vec<ReviewComment>,
}

/// Review cache persisted as `<root>/PR-<n>/reviews.json`.
#[derive(Clone)]
pub struct FileReviewCache {
    documents: DocumentStore,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl FileReviewCache {
    /// Creates a cache backed by the given document store.
    ///
    /// The clock stamps each saved snapshot with its fetch time.
    #[must_use]
    pub fn new(documents: DocumentStore, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { documents, clock }
    }

    fn path_for(unit: ReviewUnit) -> Utf8PathBuf {
        Utf8PathBuf::from(unit.storage_name()).join(REVIEWS_FILE)
    }
}

#[async_trait]
impl ReviewCache for FileReviewCache {
    async fn load(&self, unit: ReviewUnit) -> ReviewCacheResult<Vec<ReviewComment>> {
        let document: Option<ReviewCacheDocument> = self
            .documents
            .read_json(Self::path_for(unit))
            .await
            .map_err(ReviewCacheError::persistence)?;
        Ok(document.map(|doc| doc.comments).unwrap_or_default())
    }

    async fn save(&self, unit: ReviewUnit, comments: &[ReviewComment]) -> ReviewCacheResult<()> {
        let document = ReviewCacheDocument {
            fetched_at: Some(self.clock.utc()),
            comments: comments.to_vec(),
        };
        self.documents
            .write_json(Self::path_for(unit), &document)
            .await
            .map_err(ReviewCacheError::persistence)
    }
}
