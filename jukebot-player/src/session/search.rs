//! Song search
//!
//! Turns free text into a single song entry. The search service itself is
//! external; [`StaticCatalog`] answers from a configured track list.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::playback::SongEntry;
use jukebot_common::time::millis_to_secs;
use jukebot_common::RequesterId;

/// Artist shown when a track has none
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Source of songs for free-text queries
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return the top hit for `query` as an entry owned by `requester`
    async fn search(&self, requester: RequesterId, query: &str) -> Result<Option<SongEntry>>;
}

/// A track as a search backend reports it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogTrack {
    pub uri: String,
    /// First credited artist, if any
    #[serde(default)]
    pub artist: Option<String>,
    pub title: String,
    pub duration_ms: u64,
}

impl CatalogTrack {
    /// Build the entry a requester confirms
    pub fn to_entry(&self, requester: RequesterId) -> SongEntry {
        let artist = self
            .artist
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(UNKNOWN_ARTIST);

        SongEntry::new(
            self.uri.clone(),
            artist,
            self.title.clone(),
            millis_to_secs(self.duration_ms),
            requester,
        )
    }

    fn matches(&self, words: &[String]) -> bool {
        let haystack = format!(
            "{} {}",
            self.artist.as_deref().unwrap_or_default(),
            self.title
        )
        .to_lowercase();
        words.iter().all(|w| haystack.contains(w.as_str()))
    }
}

/// In-memory catalog searched word by word
///
/// A track matches when every query word appears in its artist or title,
/// ignoring case. The first match in catalog order wins.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tracks: Vec<CatalogTrack>,
}

impl StaticCatalog {
    pub fn new(tracks: Vec<CatalogTrack>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[async_trait]
impl SearchProvider for StaticCatalog {
    async fn search(&self, requester: RequesterId, query: &str) -> Result<Option<SongEntry>> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return Ok(None);
        }

        let hit = self.tracks.iter().find(|t| t.matches(&words));
        debug!("Search {:?} for {}: {:?}", query, requester, hit.map(|t| &t.uri));
        Ok(hit.map(|t| t.to_entry(requester)))
    }
}
