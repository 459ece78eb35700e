//! Adapter implementations for generation ports.

pub mod channel;
pub mod file;
pub mod memory;

pub use channel::{ChannelProgressObserver, ProgressEvent};
pub use file::FileCheckpointStore;
pub use memory::{InMemoryCheckpointStore, ScriptedTaskAnalyzer};
