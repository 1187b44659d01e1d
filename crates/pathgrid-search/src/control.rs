//! Cooperative pause/cancel control for a search run.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Upper bound on every blocking wait inside the worker. A cancel
/// request is observed within one interval.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct Flags {
    paused: bool,
    cancelled: bool,
}

/// Cloneable pause/cancel token shared between the controller and the
/// search worker.
///
/// Both flags live behind a single mutex; the paired condvar wakes a
/// paused or sleeping worker as soon as the controller flips either
/// flag, instead of the worker spinning on the fields.
#[derive(Clone)]
pub struct SearchControl {
    shared: Arc<(Mutex<Flags>, Condvar)>,
}

impl SearchControl {
    pub fn new() -> Self {
        Self {
            shared: Arc::new((Mutex::new(Flags::default()), Condvar::new())),
        }
    }

    fn flags(&self) -> std::sync::MutexGuard<'_, Flags> {
        self.shared.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the worker should currently hold at a pause point.
    pub fn should_pause(&self) -> bool {
        self.flags().paused
    }

    /// Whether the run has been asked to stop.
    pub fn should_cancel(&self) -> bool {
        self.flags().cancelled
    }

    /// Ask the worker to hold at its next pause point.
    pub fn pause(&self) {
        self.flags().paused = true;
    }

    /// Let a paused worker continue.
    pub fn resume(&self) {
        self.flags().paused = false;
        self.shared.1.notify_all();
    }

    /// Flip the pause flag, returning the new state.
    pub fn toggle_pause(&self) -> bool {
        let paused = {
            let mut flags = self.flags();
            flags.paused = !flags.paused;
            flags.paused
        };
        if !paused {
            self.shared.1.notify_all();
        }
        paused
    }

    /// Ask the run to stop. The worker exits at its next poll, leaving
    /// whatever partial state is on the grid.
    pub fn cancel(&self) {
        self.flags().cancelled = true;
        self.shared.1.notify_all();
    }

    /// Block while paused, waking at least once per [`POLL_INTERVAL`].
    ///
    /// Queue state is untouched by pausing; this only parks the calling
    /// thread. Returns `true` if cancellation was requested, which ends
    /// the wait immediately.
    pub fn wait_while_paused(&self) -> bool {
        let (lock, cvar) = &*self.shared;
        let mut flags = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while flags.paused && !flags.cancelled {
            let (guard, _) = cvar
                .wait_timeout(flags, POLL_INTERVAL)
                .unwrap_or_else(PoisonError::into_inner);
            flags = guard;
        }
        flags.cancelled
    }

    /// Pacing sleep that ends early on cancellation.
    ///
    /// Returns `true` if cancellation was requested before the duration
    /// elapsed; the wait never exceeds the deadline by more than a
    /// scheduler wake.
    pub fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.should_cancel();
        }
        let deadline = Instant::now() + duration;
        let (lock, cvar) = &*self.shared;
        let mut flags = lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if flags.cancelled {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let step = (deadline - now).min(POLL_INTERVAL);
            let (guard, _) = cvar
                .wait_timeout(flags, step)
                .unwrap_or_else(PoisonError::into_inner);
            flags = guard;
        }
    }
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SearchControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = self.flags();
        f.debug_struct("SearchControl")
            .field("paused", &flags.paused)
            .field("cancelled", &flags.cancelled)
            .finish()
    }
}
