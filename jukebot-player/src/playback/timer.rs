//! Advance timer
//!
//! One-shot scheduling of the end-of-song callback. The coordinator only
//! talks to the [`AdvanceTimer`] trait so tests can swap the tokio-backed
//! timer for [`ManualTimer`] and fire callbacks on demand.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::trace;

/// Work to run when a timer fires
pub type TimerCallback = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Identifies one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Single-shot scheduling primitive
pub trait AdvanceTimer: Send + Sync {
    /// Run `callback` once, `after` from now
    fn arm(&self, after: Duration, callback: TimerCallback) -> TimerHandle;

    /// Stop a callback that has not fired yet
    ///
    /// Cancelling a handle that already fired or was already cancelled is a
    /// no-op.
    fn cancel(&self, handle: TimerHandle);
}

/// Timer backed by tokio's monotonic clock
///
/// Each armed timer is a spawned task sleeping for the requested duration.
/// Must be armed from within a tokio runtime.
#[derive(Default)]
pub struct TokioTimer {
    next_id: AtomicU64,
    pending: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers armed but not yet fired or cancelled
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl AdvanceTimer for TokioTimer {
    fn arm(&self, after: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);

        // Hold the map while spawning so the task cannot deregister before
        // it has been registered.
        let mut guard = self.pending.lock();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            pending.lock().remove(&id);
            trace!("Timer {} fired after {:?}", id, after);
            callback.await;
        });
        guard.insert(id, task.abort_handle());

        trace!("Timer {} armed for {:?}", id, after);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = self.pending.lock().remove(&handle.0) {
            task.abort();
            trace!("Timer {} cancelled", handle.0);
        }
    }
}

struct Scheduled {
    after: Duration,
    callback: TimerCallback,
}

/// Timer that only fires when told to
///
/// Records every armed callback with its requested duration; tests drive
/// time by calling [`ManualTimer::fire_next`].
#[derive(Default)]
pub struct ManualTimer {
    next_id: AtomicU64,
    pending: Mutex<BTreeMap<u64, Scheduled>>,
    ignore_cancel: bool,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer whose `cancel` does nothing
    ///
    /// Models a callback that was already in flight when it was cancelled,
    /// so the consumer has to suppress stale fires on its own.
    pub fn ignoring_cancel() -> Self {
        Self {
            ignore_cancel: true,
            ..Self::default()
        }
    }

    /// Number of armed callbacks waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Requested durations of waiting callbacks, oldest first
    pub fn pending_durations(&self) -> Vec<Duration> {
        self.pending.lock().values().map(|s| s.after).collect()
    }

    /// Fire the oldest waiting callback and run it to completion
    ///
    /// Returns `false` when nothing was armed.
    pub async fn fire_next(&self) -> bool {
        let next = self.pending.lock().pop_first();
        match next {
            Some((id, scheduled)) => {
                trace!("Manual timer {} fired", id);
                scheduled.callback.await;
                true
            }
            None => false,
        }
    }
}

impl AdvanceTimer for ManualTimer {
    fn arm(&self, after: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().insert(id, Scheduled { after, callback });
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if self.ignore_cancel {
            return;
        }
        self.pending.lock().remove(&handle.0);
    }
}
