//! Shared batch progress counters.
//!
//! Observers (a UI, the log) read these at any time while jobs are running;
//! values are eventually consistent with job completion.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Progress for the batch currently in flight.
///
/// `completed` only ever increases while a batch runs; both counters reset
/// to zero once the batch fully settles (or fails its preconditions before
/// any job starts).
#[derive(Debug, Default)]
pub struct BatchProgress {
    completed: AtomicUsize,
    total: AtomicUsize,
    active: AtomicBool,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(completed, total)` as of this instant.
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.completed.load(Ordering::SeqCst),
            self.total.load(Ordering::SeqCst),
        )
    }

    /// True while a batch is in flight. Callers use this to disable actions
    /// that would conflict with the running batch.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Arms the counters for a new batch of `total` jobs.
    pub(crate) fn start(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
    }

    /// Records one settled job, success or captured failure alike.
    pub(crate) fn settle_one(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Records `n` settled jobs at once (a whole row failing to decode).
    pub(crate) fn settle_many(&self, n: usize) {
        self.completed.fetch_add(n, Ordering::SeqCst);
    }

    /// Clears the counters after the batch has fully settled.
    pub(crate) fn clear(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lifecycle() {
        let progress = BatchProgress::new();
        assert_eq!(progress.snapshot(), (0, 0));
        assert!(!progress.is_active());

        progress.start(4);
        assert_eq!(progress.snapshot(), (0, 4));
        assert!(progress.is_active());

        progress.settle_one();
        progress.settle_many(2);
        assert_eq!(progress.snapshot(), (3, 4));

        progress.settle_one();
        assert_eq!(progress.snapshot(), (4, 4));

        progress.clear();
        assert_eq!(progress.snapshot(), (0, 0));
        assert!(!progress.is_active());
    }
}
