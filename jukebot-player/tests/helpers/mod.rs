//! Test helper modules for jukebot-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - RecordingBackend: records play/pause calls, can be told to fail
//! - Builders for coordinators wired to manual or tokio timers

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jukebot_common::events::EventBus;
use jukebot_common::RequesterId;
use jukebot_player::playback::{AdvanceTimer, Coordinator, ManualTimer, PlaybackBackend, TokioTimer};
use jukebot_player::{BackendError, SongEntry};

/// A call the coordinator made on the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// Play, identified by track URI
    Play(String),
    Pause,
}

/// Backend that records calls and fails on request
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    /// Results handed out to upcoming calls, front first; empty means Ok
    scripted_failures: Mutex<VecDeque<BackendError>>,
    /// Calls currently executing, for overlap detection
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Artificial latency per call
    latency: Option<Duration>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose calls take `latency` to complete
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: BackendError) {
        self.scripted_failures.lock().push_back(error);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// URIs of all play calls in order
    pub fn played(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                BackendCall::Play(uri) => Some(uri.clone()),
                BackendCall::Pause => None,
            })
            .collect()
    }

    pub fn pause_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| **c == BackendCall::Pause)
            .count()
    }

    /// Most calls that were ever executing at the same moment
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: BackendCall) -> Result<(), BackendError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.calls.lock().push(call);
        let outcome = self.scripted_failures.lock().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlaybackBackend for RecordingBackend {
    async fn play(&self, entry: &SongEntry) -> Result<(), BackendError> {
        self.record(BackendCall::Play(entry.uri().to_string())).await
    }

    async fn pause(&self) -> Result<(), BackendError> {
        self.record(BackendCall::Pause).await
    }
}

/// Song entry with a predictable URI (`uri:<id>`)
pub fn song(id: &str, duration_secs: f64) -> SongEntry {
    song_from(id, duration_secs, 1)
}

pub fn song_from(id: &str, duration_secs: f64, requester: i64) -> SongEntry {
    SongEntry::new(
        format!("uri:{}", id),
        format!("Artist {}", id),
        format!("Title {}", id),
        duration_secs,
        RequesterId(requester),
    )
}

pub fn play(id: &str) -> BackendCall {
    BackendCall::Play(format!("uri:{}", id))
}

/// Coordinator wired to a manual timer
pub fn manual_coordinator() -> (Arc<Coordinator>, Arc<RecordingBackend>, Arc<ManualTimer>) {
    let backend = Arc::new(RecordingBackend::new());
    let timer = Arc::new(ManualTimer::new());
    let coordinator = build(backend.clone(), timer.clone());
    (coordinator, backend, timer)
}

/// Coordinator wired to the tokio timer
pub fn tokio_coordinator(backend: Arc<RecordingBackend>) -> Arc<Coordinator> {
    build(backend, Arc::new(TokioTimer::new()))
}

fn build(backend: Arc<RecordingBackend>, timer: Arc<dyn AdvanceTimer>) -> Arc<Coordinator> {
    Coordinator::new(backend, timer, EventBus::new(256))
}
