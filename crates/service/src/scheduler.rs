//! Deferred work for the single-threaded form loop.
//!
//! Timers never run form logic themselves. When one elapses it yields a
//! [`Fired`] value that the owner of the form feeds back through
//! `LoginForm::fire`, so every mutation still happens on the dispatch task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::clock::{duration_ms, Clock, ManualClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Work the form defers to a later turn of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Write the pending draft after the debounce window.
    FlushDraft,
    /// Finish the simulated login call.
    CompleteSubmission,
}

/// An elapsed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub task: DeferredTask,
}

pub trait Scheduler: Send + Sync {
    /// Arrange for `task` to fire once `delay` has elapsed.
    fn after(&self, delay: Duration, task: DeferredTask) -> TimerHandle;
    /// Drop a timer. Unknown or already fired handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tokio-backed scheduler: each timer is a sleeping task that posts to a channel.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<Fired>,
    next_id: AtomicU64,
    timers: Mutex<HashMap<TimerHandle, JoinHandle<()>>>,
}

impl TokioScheduler {
    /// Must be called inside a tokio runtime. The receiver is the event
    /// loop's timer inbox.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Fired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sched = Arc::new(Self { tx, next_id: AtomicU64::new(1), timers: Mutex::new(HashMap::new()) });
        (sched, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: DeferredTask) -> TimerHandle {
        let handle = TimerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let tx = self.tx.clone();
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // receiver gone means the loop has shut down
            let _ = tx.send(Fired { handle, task });
        });
        let mut timers = lock(&self.timers);
        timers.retain(|_, j| !j.is_finished());
        timers.insert(handle, join);
        trace!(timer = handle.id(), ?task, delay_ms = delay.as_millis() as u64, "timer_scheduled");
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(join) = lock(&self.timers).remove(&handle) {
            join.abort();
            trace!(timer = handle.id(), "timer_cancelled");
        }
    }
}

#[derive(Debug, Default)]
struct ManualQueue {
    next_id: u64,
    /// (due_ms, handle, task)
    pending: Vec<(i64, TimerHandle, DeferredTask)>,
}

/// Deterministic scheduler driven by a [`ManualClock`].
///
/// Nothing fires on its own; call [`ManualScheduler::pop_due`] to take the
/// earliest timer due by a deadline. Clones share the same queue and clock.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: ManualClock,
    queue: Arc<Mutex<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self { clock, queue: Arc::new(Mutex::new(ManualQueue::default())) }
    }

    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.queue).pending.len()
    }

    /// Remove and return the earliest timer due at or before `deadline_ms`,
    /// moving the clock forward to its due time.
    pub fn pop_due(&self, deadline_ms: i64) -> Option<Fired> {
        let mut q = lock(&self.queue);
        let idx = q
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (due, _, _))| *due <= deadline_ms)
            .min_by_key(|(_, (due, handle, _))| (*due, *handle))
            .map(|(i, _)| i)?;
        let (due, handle, task) = q.pending.remove(idx);
        drop(q);
        if due > self.clock.now_ms() {
            self.clock.set(due);
        }
        Some(Fired { handle, task })
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, task: DeferredTask) -> TimerHandle {
        let due = self.clock.now_ms().saturating_add(duration_ms(delay));
        let mut q = lock(&self.queue);
        q.next_id += 1;
        let handle = TimerHandle(q.next_id);
        q.pending.push((due, handle, task));
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        lock(&self.queue).pending.retain(|(_, h, _)| *h != handle);
    }
}
