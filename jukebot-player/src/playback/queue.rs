//! Ordered queue of pending song entries
//!
//! FIFO, unbounded, safe to share between tasks. Entries leave only through
//! [`OrderedQueue::dequeue_front`], which the coordinator calls while holding
//! its own lock.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::entry::SongEntry;
use jukebot_common::RequesterId;

/// Queue of songs waiting to be played
#[derive(Clone, Default)]
pub struct OrderedQueue {
    entries: Arc<RwLock<VecDeque<SongEntry>>>,
}

impl OrderedQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the tail
    ///
    /// Returns the queue length right after insertion.
    pub async fn enqueue(&self, entry: SongEntry) -> usize {
        let mut entries = self.entries.write().await;
        debug!("Enqueued entry {} at position {}", entry.entry_id(), entries.len());
        entries.push_back(entry);
        entries.len()
    }

    /// Remove and return the head entry, or `None` when empty
    pub async fn dequeue_front(&self) -> Option<SongEntry> {
        let entry = self.entries.write().await.pop_front();
        if let Some(ref entry) = entry {
            debug!("Dequeued entry {}", entry.entry_id());
        }
        entry
    }

    /// Get queue size
    ///
    /// Snapshot read; may be stale by the time the caller looks at it.
    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if queue is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Copy of all queued entries, head first
    pub async fn snapshot(&self) -> Vec<SongEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Number of queued entries requested by `requester`
    pub async fn count_requested_by(&self, requester: RequesterId) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.requested_by() == requester)
            .count()
    }

    /// Zero-based position of an entry, if it is still queued
    pub async fn position_of(&self, entry_id: Uuid) -> Option<usize> {
        self.entries
            .read()
            .await
            .iter()
            .position(|e| e.entry_id() == entry_id)
    }
}
