//! Step-based progress accounting for one job

use std::sync::{Mutex, MutexGuard};

/// Receives the job's progress percentage after every completed step
pub type ProgressSink = Box<dyn Fn(u8) + Send + Sync>;

/// Counts completed steps against a fixed budget and publishes percentages
///
/// Target work may finish concurrently; the counter update and the publish
/// happen under one lock so published values never go backwards.
pub struct ProgressTracker {
    total: usize,
    done: Mutex<usize>,
    sink: ProgressSink,
}

impl ProgressTracker {
    /// Create a tracker for `total` steps (at least 1)
    pub fn new(total: usize, sink: ProgressSink) -> Self {
        Self {
            total: total.max(1),
            done: Mutex::new(0),
            sink,
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.done.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `steps` completed steps and publish the new percentage
    pub fn advance(&self, steps: usize) -> u8 {
        if steps == 0 {
            return self.percent();
        }
        let mut done = self.lock();
        *done = (*done + steps).min(self.total);
        let percent = percent_of(*done, self.total);
        (self.sink)(percent);
        percent
    }

    /// Current percentage
    pub fn percent(&self) -> u8 {
        percent_of(*self.lock(), self.total)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// `floor(100 * done / total)`
fn percent_of(done: usize, total: usize) -> u8 {
    let pct = done.saturating_mul(100) / total.max(1);
    pct.min(100) as u8
}
