//! Playback coordination: queue, timer, backend and the coordinator

pub mod backend;
pub mod coordinator;
pub mod entry;
pub mod queue;
pub mod timer;

pub use backend::{LoggingBackend, PlaybackBackend};
pub use coordinator::Coordinator;
pub use entry::SongEntry;
pub use queue::OrderedQueue;
pub use timer::{AdvanceTimer, ManualTimer, TimerCallback, TimerHandle, TokioTimer};
