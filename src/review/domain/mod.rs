//! Domain model for review comments and thread reconciliation.
//!
//! Comments are immutable snapshots of remote feedback. Reconciliation is a
//! pure classification over comments and tasks; it never mutates either.

mod comment;
mod error;
mod ids;
mod reconcile;
mod report;

pub use comment::ReviewComment;
pub use error::ReviewDomainError;
pub use ids::{CommentId, ReviewId, ReviewUnit};
pub use reconcile::reconcile;
pub use report::{CommentProgress, ReportSummary, ThreadStatus, UnresolvedReport};
