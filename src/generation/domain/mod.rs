//! Domain model for batch task generation.
//!
//! Everything here is pure: configuration, batch planning, validation of
//! analyzer output, deduplication, and run bookkeeping. Side effects live
//! behind the ports in [`crate::generation::ports`].

mod config;
mod dedup;
mod draft;
mod run;
mod schedule;

pub use config::{
    AnalysisOptions, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_MAX_TIMEOUT_SECS,
    DeduplicationConfig, GenerationConfig, GenerationConfigError,
};
pub use dedup::Deduplicator;
pub use draft::{
    DraftParseError, DraftRejection, ParsedDrafts, RawDraftTask, ValidatedDraft,
    parse_analyzer_output,
};
pub use run::{RunCheckpoint, RunReport, RunState, RunStatus, fingerprint_comments};
pub use schedule::{BatchSchedule, BatchWindow};
