//! Review sync and thread status services.

mod status;
mod sync;

pub use status::{ThreadStatusError, ThreadStatusService};
pub use sync::{ReviewSyncError, ReviewSyncService, SyncOutcome};
