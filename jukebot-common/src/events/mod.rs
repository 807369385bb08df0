//! Event types for the jukebot event system
//!
//! Provides shared event definitions and the EventBus used by the playback
//! coordinator to report transitions to observers.

mod playback_types;
mod shared_types;

pub use playback_types::PlaybackState;
pub use shared_types::{RequesterId, SongInfo};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Jukebot event types
///
/// Events are broadcast via EventBus and serialize with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JukebotEvent {
    /// A song was appended to the queue
    SongQueued {
        song: SongInfo,
        /// Queue length observed right after insertion
        queue_length: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A song entered the now-playing slot and the backend was told to play it
    SongStarted {
        song: SongInfo,
        /// Songs still waiting behind it
        queue_length: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The queue ran dry; the backend was told to pause
    PlaybackIdle {
        /// Song that was playing before the slot was cleared, if any
        previous: Option<SongInfo>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A backend call failed during an advance
    ///
    /// The now-playing slot keeps the attempted song. This is how failures on
    /// the timer path reach an observer, since nobody awaits that path.
    BackendFailed {
        /// Song the failed call was about (None for a failed pause)
        song: Option<SongInfo>,
        /// Error description
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl JukebotEvent {
    /// Playback state implied by this event, if it changes one
    pub fn resulting_state(&self) -> Option<PlaybackState> {
        match self {
            JukebotEvent::SongStarted { .. } => Some(PlaybackState::Playing),
            JukebotEvent::PlaybackIdle { .. } => Some(PlaybackState::Idle),
            JukebotEvent::SongQueued { .. } | JukebotEvent::BackendFailed { .. } => None,
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JukebotEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<JukebotEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: JukebotEvent,
    ) -> Result<usize, broadcast::error::SendError<JukebotEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: JukebotEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
