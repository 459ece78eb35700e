//! On-disk representation of a task collection.

use crate::review::domain::ReviewUnit;
use crate::task::domain::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current document format version.
pub(super) const TASK_DOCUMENT_VERSION: u32 = 1;

/// Task collection document stored as `tasks.json`.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct TaskDocument {
    pub(super) version: u32,
    pub(super) review_unit: ReviewUnit,
    pub(super) saved_at: DateTime<Utc>,
    pub(super) tasks: Vec<Task>,
}

impl TaskDocument {
    pub(super) fn new(review_unit: ReviewUnit, tasks: Vec<Task>, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: TASK_DOCUMENT_VERSION,
            review_unit,
            saved_at,
            tasks,
        }
    }
}
