//! Domain model for review-derived tasks.
//!
//! Tasks carry two kinds of state: content refreshed whenever feedback is
//! re-analyzed, and lifecycle state recorded by operators. The merge rules in
//! [`merge_tasks`] keep the latter intact across regeneration.

mod error;
mod ids;
mod merge;
mod similarity;
mod status;
mod task;
mod verification;

pub use error::{ParsePriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskKey};
pub use merge::{MergeOutcome, MergeReport, merge_tasks, merge_tasks_excluding};
pub use similarity::{SimilarityThreshold, TextSimilarity, normalize_text};
pub use status::{ImplementationStatus, Priority, TaskStatus, VerificationStatus};
pub use task::{NewTask, Task};
pub use verification::VerificationResult;
