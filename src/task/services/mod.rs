//! Application services for task lifecycle orchestration.

mod cancellation;
mod hooks;
mod lifecycle;

pub use cancellation::{
    CancelOutcome, DEFAULT_CANCEL_REPLY_TEMPLATE, RemoteNotification, TaskCancellationService,
};
pub use hooks::ResolveThreadOnCompletion;
pub use lifecycle::{
    StatusUpdate, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService, TaskSummary,
};
