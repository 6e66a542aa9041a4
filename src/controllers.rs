//! Controller handing duty-cycle results from a background worker to the render loop.
//!
//! The controller owns a single-slot buffer holding the most recently completed
//! [`DutySnapshot`] and a busy flag. Both live behind one mutex that is held only to
//! copy results in or out, never while a window is being evaluated. At most one
//! worker runs at a time; requests made while it runs are dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::data::duty::{DutyEngine, DutySnapshot};

/// Cloneable handle shared by the render loop and the worker it launches.
#[derive(Clone)]
pub struct BrightnessController {
    engine: DutyEngine,
    pub(crate) inner: Arc<Mutex<BrightnessInner>>,
}

pub(crate) struct BrightnessInner {
    pub(crate) latest: DutySnapshot,
    pub(crate) busy: bool,
    pub(crate) completed: u64,
    pub(crate) listeners: Vec<Sender<DutySnapshot>>,
}

impl BrightnessController {
    /// Create a controller whose buffer starts all-dark.
    pub fn new(engine: DutyEngine) -> Self {
        let width = engine.width();
        Self {
            engine,
            inner: Arc::new(Mutex::new(BrightnessInner {
                latest: DutySnapshot::idle(width),
                busy: false,
                completed: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn engine(&self) -> &DutyEngine {
        &self.engine
    }

    /// Start evaluating the window `[end - length, end]` on a worker thread.
    ///
    /// Returns `None` without doing anything when a worker is already in flight;
    /// the caller keeps rendering the previously published snapshot.
    pub fn request_evaluation(&self, end: u64, length: u64) -> Option<JoinHandle<()>> {
        if !self.try_begin() {
            tracing::trace!(end, length, "worker busy, dropping request");
            return None;
        }
        let this = self.clone();
        let handle = thread::Builder::new()
            .name("dutyscope-worker".into())
            .spawn(move || this.run(end, length));
        match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!(%err, "failed to spawn duty-cycle worker");
                self.lock().busy = false;
                None
            }
        }
    }

    /// The most recently completed snapshot.
    pub fn read_latest(&self) -> DutySnapshot {
        self.lock().latest.clone()
    }

    /// Whether a worker is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Number of snapshots published so far.
    pub fn completed(&self) -> u64 {
        self.lock().completed
    }

    /// Subscribe to published snapshots. Disconnected receivers are pruned on publish.
    pub fn subscribe(&self) -> Receiver<DutySnapshot> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.lock().listeners.push(tx);
        rx
    }

    /// Check-and-set the busy flag. `false` means a worker already owns the slot.
    pub(crate) fn try_begin(&self) -> bool {
        let mut inner = self.lock();
        if inner.busy {
            return false;
        }
        inner.busy = true;
        true
    }

    /// Replace the whole snapshot and release the busy flag.
    pub(crate) fn publish(&self, snapshot: DutySnapshot) {
        let mut inner = self.lock();
        inner.listeners.retain(|s| s.send(snapshot.clone()).is_ok());
        inner.latest = snapshot;
        inner.busy = false;
        inner.completed += 1;
    }

    fn run(&self, end: u64, length: u64) {
        self.run_with(end, length, || self.engine.evaluate(end, length));
    }

    /// Worker body: publish what `evaluate` returns, or release the slot if it panics.
    pub(crate) fn run_with<F>(&self, end: u64, length: u64, evaluate: F)
    where
        F: FnOnce() -> DutySnapshot,
    {
        match panic::catch_unwind(AssertUnwindSafe(evaluate)) {
            Ok(snapshot) => self.publish(snapshot),
            Err(_) => {
                tracing::error!(end, length, "duty-cycle worker panicked");
                self.lock().busy = false;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrightnessInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
