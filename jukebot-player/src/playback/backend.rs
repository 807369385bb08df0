//! Playback backend adapter
//!
//! The streaming service that actually renders audio is an external
//! collaborator. The coordinator drives it through [`PlaybackBackend`] and
//! assumes any credentials are already valid when it calls.

use async_trait::async_trait;
use tracing::info;

use super::entry::SongEntry;
use crate::error::BackendError;

/// Play/pause capability of a streaming backend
///
/// Calls are made while the coordinator holds its lock, so implementations
/// should bound their own latency (request timeouts and the like).
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Start playing `entry`, replacing whatever was playing
    async fn play(&self, entry: &SongEntry) -> Result<(), BackendError>;

    /// Pause playback
    async fn pause(&self) -> Result<(), BackendError>;
}

/// Backend that only logs what it is asked to do
///
/// Used by the console binary when no streaming service is attached.
#[derive(Debug, Default, Clone)]
pub struct LoggingBackend;

impl LoggingBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlaybackBackend for LoggingBackend {
    async fn play(&self, entry: &SongEntry) -> Result<(), BackendError> {
        info!(
            uri = entry.uri(),
            requested_by = %entry.requested_by(),
            "Backend play: {} - {} ({:.1}s)",
            entry.artist(),
            entry.title(),
            entry.duration_secs()
        );
        Ok(())
    }

    async fn pause(&self) -> Result<(), BackendError> {
        info!("Backend pause");
        Ok(())
    }
}
