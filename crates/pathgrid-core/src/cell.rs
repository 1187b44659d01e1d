//! Cell arena entries and their display-state projection.

use crate::geom::Point;

/// Sentinel distance for cells not yet reached by a search.
pub const UNREACHABLE: i32 = i32::MAX;

/// Display-only projection of a cell's current role.
///
/// The search and the edit operations write these tags; only the
/// rendering side reads them back. The algorithm itself decides on the
/// obstacle flag and the search bookkeeping, never on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    #[default]
    Default,
    Start,
    Goal,
    Obstacle,
    /// Finalized by the search: shortest distance confirmed.
    Visited,
    /// Discovered (distance improved) but not yet finalized.
    Frontier,
    /// Interior cell of the winning path.
    Path,
}

/// One arena entry.
///
/// Cells are created once, at grid construction, with fixed coordinates;
/// everything else is mutated over the cell's life. The flat arena index
/// doubles as the cell's creation sequence id, which the search uses as
/// a stable priority-queue tie-break.
#[derive(Debug, Clone)]
pub(crate) struct Cell {
    pub(crate) pos: Point,
    pub(crate) obstacle: bool,
    pub(crate) state: CellState,
    pub(crate) distance: i32,
    pub(crate) predecessor: Option<usize>,
    pub(crate) finalized: bool,
    /// Precomputed usable neighbors, as arena indices.
    pub(crate) neighbors: Vec<usize>,
}

impl Cell {
    pub(crate) fn new(pos: Point) -> Self {
        Self {
            pos,
            obstacle: false,
            state: CellState::Default,
            distance: UNREACHABLE,
            predecessor: None,
            finalized: false,
            neighbors: Vec::new(),
        }
    }

    /// Clear the search bookkeeping, leaving role and obstacle flag alone.
    pub(crate) fn clear_bookkeeping(&mut self) {
        self.distance = UNREACHABLE;
        self.predecessor = None;
        self.finalized = false;
    }
}

/// Copy-out snapshot of a single cell, as returned by
/// [`Grid::at`](crate::grid::Grid::at).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInfo {
    pub pos: Point,
    pub state: CellState,
    pub obstacle: bool,
    pub distance: i32,
    pub predecessor: Option<Point>,
    pub finalized: bool,
}
