//! Process-wide run state
//!
//! Two independent flags shared by the orchestrator, the scheduler callback,
//! and the control surface. They are only ever mutated through the atomic
//! operations below; crawl components merely read `stop_requested`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Atomic run/stop flags for the crawl engine
///
/// Constructed once at process start and passed by `Arc` to every consumer.
#[derive(Debug, Default)]
pub struct RunState {
    in_progress: AtomicBool,
    stop_requested: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim the run lock; false if a run is already in progress
    pub fn try_start(&self) -> bool {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Ask the current run to stop at its next check point
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Reset both flags; called exactly once per run, when it finishes
    pub fn finish(&self) {
        self.in_progress.store(false, Ordering::Release);
        self.stop_requested.store(false, Ordering::Release);
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}
