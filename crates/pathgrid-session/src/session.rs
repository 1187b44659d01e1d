//! Discrete-intent surface over one grid and one runner.

use pathgrid_core::{Grid, Point};
use pathgrid_mapgen::Algorithm;
use pathgrid_search::{NullSink, Pacing, ProgressSink};
use rand::Rng;

use crate::config::GridConfig;
use crate::error::SessionError;
use crate::intent::Intent;
use crate::runner::{RunStatus, SearchRunner};

/// One grid, one worker, and the intent dispatch between them.
///
/// The input collaborator resolves raw events into [`Intent`] values
/// and feeds them to [`Session::apply`]; the render collaborator reads
/// [`Session::grid`] snapshots and [`Session::status`]. While a run is
/// in flight the worker is the sole mutator of cell state, so every
/// grid-mutating intent is rejected with [`SessionError::Busy`] until
/// the run ends.
pub struct Session {
    grid: Grid,
    runner: SearchRunner,
    pacing: Pacing,
}

impl Session {
    /// Build a session with a grid derived from `config`.
    pub fn new(config: GridConfig) -> Self {
        Self::with_grid(config.build())
    }

    /// Wrap an existing grid.
    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            runner: SearchRunner::new(),
            pacing: Pacing::default(),
        }
    }

    /// The shared grid. Clone it (cheap) to hand to a renderer.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current run status snapshot.
    pub fn status(&self) -> RunStatus {
        self.runner.status()
    }

    /// Whether a search could start right now.
    pub fn can_start(&self) -> bool {
        self.runner.can_start(&self.grid)
    }

    /// Animation pacing for subsequent runs.
    pub fn set_pacing(&mut self, pacing: Pacing) {
        self.pacing = pacing;
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Dispatch one intent. Each maps onto exactly one core operation;
    /// failures are ordinary values and leave the session usable.
    pub fn apply(&mut self, intent: Intent) -> Result<(), SessionError> {
        match intent {
            Intent::SetStart(p) => {
                self.ensure_idle()?;
                self.checked_edit(p, |grid| grid.set_start(p))
            }
            Intent::SetGoal(p) => {
                self.ensure_idle()?;
                self.checked_edit(p, |grid| grid.set_goal(p))
            }
            Intent::ToggleObstacle(p) => {
                self.ensure_idle()?;
                self.checked_edit(p, |grid| grid.toggle_obstacle(p))
            }
            Intent::Generate(algorithm) => {
                self.ensure_idle()?;
                self.generate_with(algorithm, &mut rand::rng());
                Ok(())
            }
            Intent::StartSearch => self.start_search(NullSink),
            Intent::TogglePause => {
                self.runner.toggle_pause();
                Ok(())
            }
            Intent::CancelSearch => {
                self.runner.cancel();
                Ok(())
            }
            Intent::ClearPath => {
                self.ensure_idle()?;
                self.grid.reset_search_state();
                Ok(())
            }
            Intent::ClearAll => {
                self.ensure_idle()?;
                self.grid.reset_all();
                Ok(())
            }
        }
    }

    /// Launch a search that reports progress to `sink`.
    ///
    /// [`Intent::StartSearch`] uses a null sink, since renderers that
    /// poll grid snapshots need no events; this entry point serves the
    /// ones that animate incrementally.
    pub fn start_search<S>(&mut self, sink: S) -> Result<(), SessionError>
    where
        S: ProgressSink + 'static,
    {
        self.runner.start(&self.grid, self.pacing, sink)
    }

    /// Replace the obstacle layout using a caller-provided RNG, for
    /// reproducible layouts. [`Intent::Generate`] draws from the thread
    /// RNG.
    pub fn generate_with(&mut self, algorithm: Algorithm, rng: &mut impl Rng) {
        log::debug!("generating obstacle layout: {algorithm:?}");
        pathgrid_mapgen::generate(&self.grid, algorithm, rng);
        self.grid.recompute_adjacency();
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.runner.in_progress() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// Run a grid edit, translating a refusal into the right error.
    fn checked_edit(
        &self,
        p: Point,
        edit: impl FnOnce(&Grid) -> bool,
    ) -> Result<(), SessionError> {
        if !self.grid.contains(p) {
            return Err(SessionError::OutOfBounds);
        }
        if edit(&self.grid) {
            Ok(())
        } else {
            Err(SessionError::EndpointConflict)
        }
    }
}
