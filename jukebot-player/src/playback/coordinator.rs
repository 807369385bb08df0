//! Playback queue coordinator
//!
//! **Responsibilities:**
//! - Owns the now-playing slot (one song at most)
//! - Decides when an enqueue must start playback
//! - Runs the advance transition: pop the queue head, tell the backend,
//!   arm the end-of-song timer (or pause when the queue is empty)
//!
//! The slot, the "is anything playing?" decision and the whole advance
//! transition sit behind a single async mutex. The lock is held across the
//! backend call and timer arming, so a timer fire racing an enqueue can never
//! start two songs, and an enqueue landing just as the queue drains is always
//! seen by whichever advance runs next.
//!
//! State machine:
//! - `Idle --enqueue--> Playing(head)`
//! - `Playing(x) --timer, queue nonempty--> Playing(next)`
//! - `Playing(x) --timer, queue empty--> Idle`

use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use super::backend::PlaybackBackend;
use super::entry::SongEntry;
use super::queue::OrderedQueue;
use super::timer::{AdvanceTimer, TimerCallback, TimerHandle};
use crate::error::{BackendError, Result};
use jukebot_common::events::{EventBus, JukebotEvent, PlaybackState};
use jukebot_common::time::now;
use jukebot_common::RequesterId;

/// Timer armed for the song in the slot
#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    handle: TimerHandle,
    /// Matches `Slot::generation` at arm time; fires carrying any other
    /// value are stale
    generation: u64,
}

/// State guarded by the coordinator lock
#[derive(Debug, Default)]
struct Slot {
    now_playing: Option<SongEntry>,
    armed: Option<ArmedTimer>,
    /// Bumped every time a song enters the slot
    generation: u64,
}

/// Coordinator for one shared playback stream
///
/// Create one per independent stream with [`Coordinator::new`]; it is always
/// handed out as `Arc<Coordinator>` because armed timers call back into it.
pub struct Coordinator {
    queue: OrderedQueue,
    slot: Mutex<Slot>,
    backend: Arc<dyn PlaybackBackend>,
    timer: Arc<dyn AdvanceTimer>,
    events: EventBus,
    /// Handed to timer callbacks so a pending timer does not keep the
    /// coordinator alive
    this: Weak<Coordinator>,
}

impl Coordinator {
    /// Create an idle coordinator with an empty queue
    pub fn new(
        backend: Arc<dyn PlaybackBackend>,
        timer: Arc<dyn AdvanceTimer>,
        events: EventBus,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            queue: OrderedQueue::new(),
            slot: Mutex::new(Slot::default()),
            backend,
            timer,
            events,
            this: this.clone(),
        })
    }

    /// Add a song to the queue
    ///
    /// Starts playback before returning when nothing is playing. Returns the
    /// queue length observed right after insertion.
    ///
    /// # Errors
    /// - `InvalidEntry` when the entry fails validation; the queue is untouched
    /// - `Backend` when starting playback failed; the entry stays in the
    ///   now-playing slot and its timer stays armed
    pub async fn enqueue(&self, entry: SongEntry) -> Result<usize> {
        if let Err(e) = entry.validate() {
            warn!("Rejected entry from {}: {}", entry.requested_by(), e);
            return Err(e);
        }

        let song = entry.info();
        let queue_length = self.queue.enqueue(entry).await;
        info!(
            "Added to queue: {} - {} (requested by {}, {} queued)",
            song.artist, song.title, song.requested_by, queue_length
        );
        self.events.emit_lossy(JukebotEvent::SongQueued {
            song,
            queue_length,
            timestamp: now(),
        });

        // Deciding under the coordinator lock: an advance in progress either
        // already popped this entry or will leave the slot empty for us.
        let mut slot = self.slot.lock().await;
        if slot.now_playing.is_none() {
            debug!("Nothing playing, advancing on enqueue");
            self.advance_locked(&mut slot).await?;
        }

        Ok(queue_length)
    }

    /// End-of-song path, run by the armed timer
    ///
    /// Fires whose generation no longer matches the armed timer are ignored.
    /// Backend failures are logged and published as
    /// [`JukebotEvent::BackendFailed`], since nobody awaits this path.
    async fn advance_on_timer_fire(&self, generation: u64) {
        let mut slot = self.slot.lock().await;

        match slot.armed {
            Some(armed) if armed.generation == generation => {
                slot.armed = None;
            }
            _ => {
                debug!("Ignoring stale timer fire (generation {})", generation);
                return;
            }
        }

        debug!("Song timer fired (generation {})", generation);
        if let Err(e) = self.advance_locked(&mut slot).await {
            debug!("Timer-driven advance finished with backend error: {}", e);
        }
    }

    /// Skip the song in the now-playing slot
    ///
    /// Cancels its timer and runs the advance transition. Returns the skipped
    /// entry, or `None` when nothing was playing.
    pub async fn skip(&self) -> Result<Option<SongEntry>> {
        let mut slot = self.slot.lock().await;

        let Some(skipped) = slot.now_playing.clone() else {
            debug!("Skip requested while idle");
            return Ok(None);
        };

        info!("Skipping {}", skipped);
        self.advance_locked(&mut slot).await?;
        Ok(Some(skipped))
    }

    /// Stop playback for shutdown
    ///
    /// Cancels the armed timer, clears the slot and pauses the backend.
    /// Queued songs are left in place.
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;

        if let Some(armed) = slot.armed.take() {
            self.timer.cancel(armed.handle);
        }

        if let Some(previous) = slot.now_playing.take() {
            info!("Stopping playback of {}", previous);
            let result = self.backend.pause().await;
            self.events.emit_lossy(JukebotEvent::PlaybackIdle {
                previous: Some(previous.info()),
                timestamp: now(),
            });
            if let Err(ref e) = result {
                self.report_backend_failure(None, e);
            }
            result?;
        }

        Ok(())
    }

    /// Advance transition; caller holds the coordinator lock
    async fn advance_locked(&self, slot: &mut Slot) -> std::result::Result<(), BackendError> {
        // A timer still armed here belongs to a song leaving the slot for
        // some reason other than that timer firing.
        if let Some(armed) = slot.armed.take() {
            self.timer.cancel(armed.handle);
        }

        loop {
            let Some(entry) = self.queue.dequeue_front().await else {
                return self.go_idle(slot).await;
            };

            // Entries are validated before they are queued
            let duration = entry.duration();
            debug_assert!(
                duration.is_some(),
                "unschedulable entry reached the queue head: {}",
                entry
            );
            let Some(duration) = duration else {
                error!("Unschedulable entry reached the queue head: {}", entry);
                continue;
            };

            slot.now_playing = Some(entry.clone());
            let result = self.backend.play(&entry).await;

            slot.generation += 1;
            let generation = slot.generation;
            let handle = self.timer.arm(duration, self.timer_callback(generation));
            slot.armed = Some(ArmedTimer { handle, generation });

            let queue_length = self.queue.size().await;
            info!(
                "Now playing: {} - {} for {:?} ({} queued)",
                entry.artist(),
                entry.title(),
                duration,
                queue_length
            );
            self.events.emit_lossy(JukebotEvent::SongStarted {
                song: entry.info(),
                queue_length,
                timestamp: now(),
            });

            if let Err(ref e) = result {
                self.report_backend_failure(Some(&entry), e);
            }
            return result;
        }
    }

    /// Empty-queue branch of the advance transition
    async fn go_idle(&self, slot: &mut Slot) -> std::result::Result<(), BackendError> {
        let previous = slot.now_playing.take();
        info!("Queue empty, pausing playback");

        let result = self.backend.pause().await;
        self.events.emit_lossy(JukebotEvent::PlaybackIdle {
            previous: previous.map(|p| p.info()),
            timestamp: now(),
        });

        if let Err(ref e) = result {
            self.report_backend_failure(None, e);
        }
        result
    }

    fn timer_callback(&self, generation: u64) -> TimerCallback {
        let this = self.this.clone();
        Box::pin(async move {
            match this.upgrade() {
                Some(coordinator) => coordinator.advance_on_timer_fire(generation).await,
                None => debug!("Coordinator dropped before timer fired"),
            }
        })
    }

    fn report_backend_failure(&self, entry: Option<&SongEntry>, error: &BackendError) {
        match entry {
            Some(entry) => warn!("Backend failed to play {}: {}", entry, error),
            None => warn!("Backend failed to pause: {}", error),
        }
        self.events.emit_lossy(JukebotEvent::BackendFailed {
            song: entry.map(SongEntry::info),
            error: error.to_string(),
            timestamp: now(),
        });
    }

    /// Song currently in the now-playing slot
    pub async fn now_playing(&self) -> Option<SongEntry> {
        self.slot.lock().await.now_playing.clone()
    }

    /// Current state of the slot
    pub async fn state(&self) -> PlaybackState {
        if self.slot.lock().await.now_playing.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    /// Number of songs waiting behind the now-playing one
    pub async fn queue_len(&self) -> usize {
        self.queue.size().await
    }

    /// Songs waiting behind the now-playing one, next first
    pub async fn queued(&self) -> Vec<SongEntry> {
        self.queue.snapshot().await
    }

    /// Number of waiting songs requested by `requester`
    pub async fn queued_by(&self, requester: RequesterId) -> usize {
        self.queue.count_requested_by(requester).await
    }

    /// Subscribe to coordinator events
    pub fn subscribe(&self) -> broadcast::Receiver<JukebotEvent> {
        self.events.subscribe()
    }
}
