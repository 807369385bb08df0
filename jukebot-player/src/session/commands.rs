//! Chat command handling
//!
//! Maps incoming chat messages to coordinator and search calls and renders
//! the reply text for the requester.

use std::sync::Arc;
use tracing::{info, warn};

use super::requester::RequesterRegistry;
use super::search::SearchProvider;
use crate::error::Error;
use crate::playback::{Coordinator, SongEntry};
use jukebot_common::RequesterId;

pub const GREETING: &str =
    "Hi! You can send me a song and/or artist name to search for music, then add it to the queue!";
pub const NO_PENDING_RESULT: &str =
    "You have no active search results. Send me a message to search for a song.";
pub const NO_SEARCH_RESULTS: &str = "Sorry, but I couldn't find any results for your search.";
pub const NOTHING_PLAYING: &str = "Nothing is playing right now.";

/// One incoming chat message
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender_id: RequesterId,
    pub username: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(sender_id: RequesterId, username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id,
            username: username.into(),
            text: text.into(),
        }
    }
}

/// What a chat message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Confirm,
    NowPlaying,
    Skip,
    /// Free text to search for
    Search(String),
    Unknown(String),
}

impl Command {
    /// Parse message text
    ///
    /// Slash commands may carry a `@botname` suffix, which is ignored.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(rest) = text.strip_prefix('/') else {
            return Command::Search(text.to_string());
        };

        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "confirm" => Command::Confirm,
            "nowplaying" | "np" => Command::NowPlaying,
            "skip" => Command::Skip,
            _ => Command::Unknown(name.to_string()),
        }
    }
}

/// Chat front end of one playback stream
pub struct ChatSession {
    coordinator: Arc<Coordinator>,
    search: Arc<dyn SearchProvider>,
    requesters: RequesterRegistry,
    /// 0 disables the limit
    max_songs_per_user: usize,
}

impl ChatSession {
    pub fn new(coordinator: Arc<Coordinator>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            coordinator,
            search,
            requesters: RequesterRegistry::new(),
            max_songs_per_user: 0,
        }
    }

    /// Limit how many songs one requester may have waiting (0 = unlimited)
    pub fn with_max_songs_per_user(mut self, limit: usize) -> Self {
        self.max_songs_per_user = limit;
        self
    }

    pub fn requesters(&self) -> &RequesterRegistry {
        &self.requesters
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Handle one message and return the reply text
    pub async fn handle(&self, message: &ChatMessage) -> String {
        let requester = self
            .requesters
            .get_or_register(message.sender_id, &message.username)
            .await;

        match Command::parse(&message.text) {
            Command::Start | Command::Help => GREETING.to_string(),
            Command::Confirm => self.confirm(requester.id).await,
            Command::NowPlaying => self.describe_now_playing().await,
            Command::Skip => self.skip(&requester.username).await,
            Command::Search(query) if query.is_empty() => NO_SEARCH_RESULTS.to_string(),
            Command::Search(query) => self.search(requester.id, &query).await,
            Command::Unknown(name) => {
                format!("Unknown command /{}. Send /help to see what I can do.", name)
            }
        }
    }

    async fn search(&self, requester: RequesterId, query: &str) -> String {
        match self.search.search(requester, query).await {
            Ok(Some(entry)) => {
                let reply = format!(
                    "I found a song:\n{} - {}\nEnter (or tap) /confirm to add it to the queue, \
                     or just send a message to search again!",
                    entry.artist(),
                    entry.title()
                );
                self.requesters.set_pending(requester, entry).await;
                reply
            }
            Ok(None) => NO_SEARCH_RESULTS.to_string(),
            Err(e) => {
                warn!("Search for {} failed: {}", requester, e);
                "Sorry, searching is not working right now. Please try again later.".to_string()
            }
        }
    }

    async fn confirm(&self, requester: RequesterId) -> String {
        if self.requesters.pending(requester).await.is_none() {
            return NO_PENDING_RESULT.to_string();
        }

        if self.max_songs_per_user > 0 {
            let waiting = self.coordinator.queued_by(requester).await;
            if waiting >= self.max_songs_per_user {
                info!("Refusing song from {}: {} already queued", requester, waiting);
                return format!(
                    "You already have {} songs waiting in the queue. \
                     Try again once one of them has played.",
                    waiting
                );
            }
        }

        // A search may have replaced the result since the check above; queue
        // whatever is pending now.
        let Some(entry) = self.requesters.take_pending(requester).await else {
            return NO_PENDING_RESULT.to_string();
        };
        self.enqueue_reply(&entry, self.coordinator.enqueue(entry.clone()).await)
    }

    fn enqueue_reply(&self, entry: &SongEntry, outcome: crate::Result<usize>) -> String {
        match outcome {
            Ok(queue_length) => format!(
                "{} - {} has been queued. There are approx. {} songs in the queue.",
                entry.artist(),
                entry.title(),
                queue_length
            ),
            Err(Error::Backend(e)) => format!(
                "{} - {} has been queued, but the player reported a problem: {}",
                entry.artist(),
                entry.title(),
                e
            ),
            Err(e) => format!("Sorry, {} - {} could not be queued: {}", entry.artist(), entry.title(), e),
        }
    }

    async fn describe_now_playing(&self) -> String {
        let Some(entry) = self.coordinator.now_playing().await else {
            return NOTHING_PLAYING.to_string();
        };

        let requested_by = self.requesters.username(entry.requested_by()).await;
        format!(
            "Now playing: {} - {} (requested by {}). {} songs queued.",
            entry.artist(),
            entry.title(),
            requested_by,
            self.coordinator.queue_len().await
        )
    }

    async fn skip(&self, username: &str) -> String {
        match self.coordinator.skip().await {
            Ok(Some(skipped)) => {
                info!("{} skipped {}", username, skipped);
                format!("Skipped {} - {}.", skipped.artist(), skipped.title())
            }
            Ok(None) => NOTHING_PLAYING.to_string(),
            Err(e) => format!("Skipped, but the player reported a problem: {}", e),
        }
    }
}
