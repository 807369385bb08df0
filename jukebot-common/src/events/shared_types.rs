//! Shared type definitions for event data

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a requester, as assigned by the chat platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(pub i64);

impl std::fmt::Display for RequesterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RequesterId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Song description carried by events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    /// Queue entry UUID
    pub entry_id: Uuid,
    /// Backend URI of the track
    pub uri: String,
    pub artist: String,
    pub title: String,
    /// Length in seconds
    pub duration_secs: f64,
    /// Who asked for the song
    pub requested_by: RequesterId,
}
