//! Worker-thread lifecycle for search runs.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use pathgrid_core::{Grid, Point};
use pathgrid_search::{Pacing, ProgressSink, SearchControl, SearchEngine, SearchOutcome};

use crate::error::SessionError;

/// Point-in-time view of the runner, recomputed on demand for the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStatus {
    /// A run was launched and has not finished or been cancelled.
    pub active: bool,
    /// The in-flight run is holding at a pause point.
    pub paused: bool,
    /// The most recent run reached a terminal state.
    pub completed: bool,
    /// The most recent run found a path.
    pub path_found: bool,
    /// Length (in steps) of the most recent path, 0 if none.
    pub last_path_length: usize,
}

#[derive(Debug, Default)]
struct RunState {
    active: bool,
    completed: bool,
    path_found: bool,
    last_path_length: usize,
}

/// Owns at most one in-flight search worker plus the flags shared with
/// it.
///
/// The single-flight guard lives in `RunState.active` behind one mutex;
/// the paired condvar signals run completion so a new start can wait
/// (bounded) for the previous worker before touching shared cell state.
pub struct SearchRunner {
    control: SearchControl,
    shared: Arc<(Mutex<RunState>, Condvar)>,
    worker: Option<JoinHandle<()>>,
}

impl SearchRunner {
    pub fn new() -> Self {
        Self {
            control: SearchControl::new(),
            shared: Arc::new((Mutex::new(RunState::default()), Condvar::new())),
            worker: None,
        }
    }

    fn state(&self) -> MutexGuard<'_, RunState> {
        self.shared.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a run is currently in flight.
    pub fn in_progress(&self) -> bool {
        let st = self.state();
        st.active && !st.completed
    }

    /// Whether a run could start right now: both endpoints designated
    /// and nothing in flight.
    pub fn can_start(&self, grid: &Grid) -> bool {
        grid.start().is_some() && grid.goal().is_some() && !self.in_progress()
    }

    /// Current status snapshot.
    pub fn status(&self) -> RunStatus {
        let st = self.state();
        RunStatus {
            active: st.active && !st.completed,
            paused: self.control.should_pause(),
            completed: st.completed,
            path_found: st.path_found,
            last_path_length: st.last_path_length,
        }
    }

    /// Length of the most recently found path, 0 if none.
    pub fn last_path_length(&self) -> usize {
        self.state().last_path_length
    }

    /// Launch a search from the grid's designated endpoints on a worker
    /// thread.
    ///
    /// Rejected synchronously when endpoints are missing or a run is in
    /// flight. The previous worker (if any) is joined first; every
    /// blocking point in it is bounded, so the join is too. Then the
    /// previous run's visuals are cleared, adjacency is recomputed, and
    /// the worker starts with a fresh control token.
    pub fn start<S>(&mut self, grid: &Grid, pacing: Pacing, sink: S) -> Result<(), SessionError>
    where
        S: ProgressSink + 'static,
    {
        let (start, goal) = match (grid.start(), grid.goal()) {
            (Some(s), Some(g)) => (s, g),
            _ => return Err(SessionError::MissingEndpoints),
        };
        if self.in_progress() {
            return Err(SessionError::Busy);
        }
        self.reap_previous();

        grid.reset_search_state();
        grid.recompute_adjacency();

        self.control = SearchControl::new();
        {
            let mut st = self.state();
            st.active = true;
            st.completed = false;
            st.path_found = false;
        }

        let engine = SearchEngine::new(pacing);
        let control = self.control.clone();
        let shared = Arc::clone(&self.shared);
        let grid = grid.clone();
        log::debug!("starting search worker: {start} -> {goal}");
        self.worker = Some(thread::spawn(move || {
            run_worker(engine, grid, start, goal, sink, control, shared);
        }));
        Ok(())
    }

    /// Pause the in-flight run, if any.
    pub fn pause(&self) {
        if self.in_progress() {
            self.control.pause();
        }
    }

    /// Resume a paused run, if any.
    pub fn resume(&self) {
        self.control.resume();
    }

    /// Flip the pause state of the in-flight run. Returns the new
    /// paused state; a no-op returning `false` when nothing is running.
    pub fn toggle_pause(&self) -> bool {
        if !self.in_progress() {
            return false;
        }
        self.control.toggle_pause()
    }

    /// Hard-stop the current run.
    ///
    /// Flags flip immediately; the worker observes them within one poll
    /// interval and exits without completing in-flight work. Partial
    /// coloring stays on the grid; clearing it afterwards is the
    /// caller's choice, via the grid's reset operations.
    pub fn cancel(&self) {
        let was_active = {
            let mut st = self.state();
            let was = st.active && !st.completed;
            st.active = false;
            st.completed = true;
            was
        };
        self.control.cancel();
        self.shared.1.notify_all();
        if was_active {
            log::info!("search run cancelled");
        }
    }

    /// Join the previous worker thread, if one is still parked.
    ///
    /// Only called once the run state is terminal, so the thread is
    /// either gone or within one poll interval of exiting.
    fn reap_previous(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                // run_worker catches payload panics itself; reaching
                // this means the catch machinery unwound, which we only
                // log.
                log::error!("search worker terminated abnormally");
            }
        }
    }
}

impl Default for SearchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SearchRunner {
    fn drop(&mut self) {
        self.cancel();
        self.reap_previous();
    }
}

fn run_worker(
    engine: SearchEngine,
    grid: Grid,
    start: Point,
    goal: Point,
    mut sink: impl ProgressSink,
    control: SearchControl,
    shared: Arc<(Mutex<RunState>, Condvar)>,
) {
    // The worker boundary: panics must not leak, and the active flag
    // must be released no matter how the run ended, or the controller
    // would wait forever on a run that silently died.
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let outcome = engine.run(&grid, start, goal, &mut sink, &control);
        let length = match outcome {
            SearchOutcome::PathFound => engine.reconstruct(&grid, goal, &mut sink, &control),
            SearchOutcome::NoPath | SearchOutcome::Cancelled => 0,
        };
        (outcome, length)
    }));

    let (lock, cvar) = &*shared;
    let mut st = lock.lock().unwrap_or_else(PoisonError::into_inner);
    match result {
        Ok((outcome, length)) => {
            st.path_found = outcome == SearchOutcome::PathFound;
            st.last_path_length = length;
            match outcome {
                SearchOutcome::PathFound => log::info!("path found, length {length}"),
                SearchOutcome::NoPath => log::info!("no path between {start} and {goal}"),
                SearchOutcome::Cancelled => log::debug!("search worker observed cancellation"),
            }
        }
        Err(_) => {
            st.path_found = false;
            st.last_path_length = 0;
            log::error!("search worker panicked; releasing run state");
        }
    }
    st.active = false;
    st.completed = true;
    cvar.notify_all();
}
