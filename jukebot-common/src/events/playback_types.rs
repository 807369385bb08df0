//! Playback-related type definitions

use serde::{Deserialize, Serialize};

/// Coordinator playback state
///
/// `Idle` means the now-playing slot is empty and the backend is paused.
/// `Playing` means a song occupies the slot and its end-of-song timer is armed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing playing, no timer armed
    #[default]
    Idle,
    /// A song occupies the now-playing slot
    Playing,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Playing => write!(f, "playing"),
        }
    }
}
