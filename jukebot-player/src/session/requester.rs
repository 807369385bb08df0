//! Requester registry
//!
//! Tracks everyone who has talked to the bot, keyed by chat identity, along
//! with the song their last search turned up.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::playback::SongEntry;
use jukebot_common::RequesterId;

/// A chat user who can request songs
#[derive(Debug, Clone, PartialEq)]
pub struct Requester {
    pub id: RequesterId,
    pub username: String,
    /// Result of the last search, waiting for `/confirm`
    pub pending: Option<SongEntry>,
}

impl Requester {
    fn new(id: RequesterId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            pending: None,
        }
    }
}

impl std::fmt::Display for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.username, self.id)
    }
}

/// All known requesters
#[derive(Debug, Default)]
pub struct RequesterRegistry {
    requesters: RwLock<HashMap<RequesterId, Requester>>,
}

impl RequesterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a requester, registering them on first contact
    ///
    /// A changed username replaces the stored one.
    pub async fn get_or_register(&self, id: RequesterId, username: &str) -> Requester {
        let mut requesters = self.requesters.write().await;
        let requester = requesters.entry(id).or_insert_with(|| {
            info!("Added user {} ({})", username, id);
            Requester::new(id, username)
        });
        if requester.username != username {
            requester.username = username.to_string();
        }
        requester.clone()
    }

    pub async fn get(&self, id: RequesterId) -> Option<Requester> {
        self.requesters.read().await.get(&id).cloned()
    }

    /// Display name for a requester, falling back to the numeric id
    pub async fn username(&self, id: RequesterId) -> String {
        self.requesters
            .read()
            .await
            .get(&id)
            .map(|r| r.username.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Replace the requester's pending search result
    pub async fn set_pending(&self, id: RequesterId, entry: SongEntry) {
        if let Some(requester) = self.requesters.write().await.get_mut(&id) {
            requester.pending = Some(entry);
        }
    }

    /// Pending search result without consuming it
    pub async fn pending(&self, id: RequesterId) -> Option<SongEntry> {
        self.requesters
            .read()
            .await
            .get(&id)
            .and_then(|r| r.pending.clone())
    }

    /// Remove and return the pending search result
    pub async fn take_pending(&self, id: RequesterId) -> Option<SongEntry> {
        self.requesters
            .write()
            .await
            .get_mut(&id)
            .and_then(|r| r.pending.take())
    }

    pub async fn len(&self) -> usize {
        self.requesters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requesters.read().await.is_empty()
    }
}
