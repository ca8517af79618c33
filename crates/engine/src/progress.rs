use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

static PROGRESS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_progress_lock_poison_once(operation: &'static str) {
    if PROGRESS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "progress lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("progress overflow: all {total} registered load units already completed")]
    Overflow { total: usize },
}

/// Point-in-time progress as seen by observers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    pub ratio: f32,
}

impl ProgressUpdate {
    fn from_counts(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            ratio: ratio_of(completed, total),
        }
    }
}

pub trait ProgressObserver {
    fn on_progress(&mut self, update: ProgressUpdate);
}

/// Counts completed load units against the registered total.
#[derive(Default)]
pub struct ProgressTracker {
    completed: usize,
    total: usize,
    observers: Vec<Box<dyn ProgressObserver>>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("completed", &self.completed)
            .field("total", &self.total)
            .field("observer_count", &self.observers.len())
            .finish()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    /// Starts a new load run of `total` units. Observers see the reset to zero.
    pub fn begin(&mut self, total: usize) {
        self.completed = 0;
        self.total = total;
        debug!(total, "progress_begin");
        self.notify();
    }

    pub fn advance(&mut self) -> Result<ProgressUpdate, ProgressError> {
        if self.completed >= self.total {
            return Err(ProgressError::Overflow { total: self.total });
        }
        self.completed += 1;
        Ok(self.notify())
    }

    pub fn reset(&mut self) {
        self.completed = 0;
        self.total = 0;
    }

    pub fn ratio(&self) -> f32 {
        ratio_of(self.completed, self.total)
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    pub fn snapshot(&self) -> ProgressUpdate {
        ProgressUpdate::from_counts(self.completed, self.total)
    }

    fn notify(&mut self) -> ProgressUpdate {
        let update = self.snapshot();
        for observer in &mut self.observers {
            observer.on_progress(update);
        }
        update
    }
}

fn ratio_of(completed: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (completed as f32 / total as f32).clamp(0.0, 1.0)
}

/// Shared latest-progress cell. The tracker publishes into it; the loading
/// screen reads it when drawing.
#[derive(Clone, Debug, Default)]
pub struct ProgressHandle {
    latest: Arc<RwLock<ProgressUpdate>>,
}

impl ProgressHandle {
    pub fn snapshot(&self) -> ProgressUpdate {
        match self.latest.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_progress_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, update: ProgressUpdate) {
        match self.latest.write() {
            Ok(mut guard) => *guard = update,
            Err(poisoned) => {
                warn_progress_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = update;
            }
        }
    }
}

impl ProgressObserver for ProgressHandle {
    fn on_progress(&mut self, update: ProgressUpdate) {
        self.publish(update);
    }
}
