//! Song entries
//!
//! A song entry is one confirmed request: the track to play, how long it
//! lasts, and who asked for it. Entries are immutable once built.

use crate::error::{Error, Result};
use jukebot_common::events::SongInfo;
use jukebot_common::time::secs_to_duration;
use jukebot_common::RequesterId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// A single playable request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongEntry {
    /// Queue entry UUID, unique per request even when the same track repeats
    entry_id: Uuid,

    /// Opaque backend URI of the track
    uri: String,

    artist: String,
    title: String,

    /// Track length in seconds
    duration_secs: f64,

    requested_by: RequesterId,
}

impl SongEntry {
    /// Build an entry
    ///
    /// No validation happens here; the coordinator rejects malformed entries
    /// when they are enqueued.
    pub fn new(
        uri: impl Into<String>,
        artist: impl Into<String>,
        title: impl Into<String>,
        duration_secs: f64,
        requested_by: RequesterId,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            uri: uri.into(),
            artist: artist.into(),
            title: title.into(),
            duration_secs,
            requested_by,
        }
    }

    pub fn entry_id(&self) -> Uuid {
        self.entry_id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn requested_by(&self) -> RequesterId {
        self.requested_by
    }

    /// Time the song occupies the now-playing slot
    ///
    /// Returns `None` for entries that fail [`SongEntry::validate`].
    pub fn duration(&self) -> Option<Duration> {
        secs_to_duration(self.duration_secs)
    }

    /// Check the entry can be queued and scheduled
    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(Error::InvalidEntry(format!(
                "entry {} has no track identifier",
                self.entry_id
            )));
        }

        if self.title.trim().is_empty() {
            return Err(Error::InvalidEntry(format!(
                "entry {} ({}) has no title",
                self.entry_id, self.uri
            )));
        }

        if self.duration().is_none() {
            return Err(Error::InvalidEntry(format!(
                "entry {} ({}) has unschedulable duration {}s",
                self.entry_id, self.uri, self.duration_secs
            )));
        }

        Ok(())
    }

    /// Event payload describing this entry
    pub fn info(&self) -> SongInfo {
        SongInfo {
            entry_id: self.entry_id,
            uri: self.uri.clone(),
            artist: self.artist.clone(),
            title: self.title.clone(),
            duration_secs: self.duration_secs,
            requested_by: self.requested_by,
        }
    }
}

impl std::fmt::Display for SongEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} ({})", self.artist, self.title, self.uri)
    }
}
