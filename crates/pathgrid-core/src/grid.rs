//! The cell arena shared between the search worker and the controller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cell::{Cell, CellInfo, CellState};
use crate::geom::Point;

/// Default edge length of a rendered cell, in pixels.
pub const DEFAULT_CELL_PX: i32 = 12;

struct GridState {
    cells: Vec<Cell>,
    width: i32,
    height: i32,
    cell_px: i32,
    start: Option<usize>,
    goal: Option<usize>,
}

impl GridState {
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        Some((p.y * self.width + p.x) as usize)
    }

    fn point(&self, idx: usize) -> Point {
        Point::new(idx as i32 % self.width, idx as i32 / self.width)
    }
}

/// A `cols × rows` arena of cells behind a shared buffer.
///
/// Cloning is cheap and shares the backing buffer, so the search worker
/// and the render/input side can hold the same grid at once. Every
/// method takes the buffer lock exactly once and copies data out; no
/// reference into the arena ever escapes, and cells are addressed by
/// coordinates (externally) or arena index (internally), never by
/// pointer.
///
/// Obstacle edits invalidate the precomputed adjacency:
/// [`recompute_adjacency`](Grid::recompute_adjacency) must run after any
/// obstacle mutation and before a search consumes neighbor lists.
#[derive(Clone)]
pub struct Grid {
    inner: Arc<Mutex<GridState>>,
}

impl Grid {
    /// Create a `cols × rows` grid with the default cell pixel size.
    pub fn new(cols: i32, rows: i32) -> Self {
        Self::with_cell_px(cols, rows, DEFAULT_CELL_PX)
    }

    /// Create a grid whose cells render `cell_px` pixels square.
    ///
    /// Negative dimensions are clamped to zero; a zero-size grid is
    /// valid and every lookup on it returns `None`.
    pub fn with_cell_px(cols: i32, rows: i32, cell_px: i32) -> Self {
        let width = cols.max(0);
        let height = rows.max(0);
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(Point::new(x, y)));
            }
        }
        Self {
            inner: Arc::new(Mutex::new(GridState {
                cells,
                width,
                height,
                cell_px: cell_px.max(1),
                start: None,
                goal: None,
            })),
        }
    }

    // A poisoned lock means a worker panicked mid-mutation; the grid
    // then holds partial coloring, same as after a cancel, and stays
    // usable.
    fn lock(&self) -> MutexGuard<'_, GridState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Number of columns.
    pub fn width(&self) -> i32 {
        self.lock().width
    }

    /// Number of rows.
    pub fn height(&self) -> i32 {
        self.lock().height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.lock().cells.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.lock().cells.is_empty()
    }

    /// Whether `p` lies inside the grid.
    pub fn contains(&self, p: Point) -> bool {
        self.lock().idx(p).is_some()
    }

    // -----------------------------------------------------------------------
    // Lookups (copy-out)
    // -----------------------------------------------------------------------

    /// Bounds-checked cell lookup.
    pub fn at(&self, p: Point) -> Option<CellInfo> {
        let st = self.lock();
        let i = st.idx(p)?;
        let cell = &st.cells[i];
        Some(CellInfo {
            pos: cell.pos,
            state: cell.state,
            obstacle: cell.obstacle,
            distance: cell.distance,
            predecessor: cell.predecessor.map(|pi| st.cells[pi].pos),
            finalized: cell.finalized,
        })
    }

    /// The cell's display state, if `p` is in bounds.
    pub fn state_at(&self, p: Point) -> Option<CellState> {
        let st = self.lock();
        st.idx(p).map(|i| st.cells[i].state)
    }

    /// Whether the cell at `p` is an obstacle. Out-of-bounds counts as
    /// not an obstacle (there is no cell to block).
    pub fn is_obstacle(&self, p: Point) -> bool {
        let st = self.lock();
        st.idx(p).is_some_and(|i| st.cells[i].obstacle)
    }

    /// Tentative distance recorded at `p`, or [`UNREACHABLE`] out of
    /// bounds.
    ///
    /// [`UNREACHABLE`]: crate::cell::UNREACHABLE
    pub fn distance_at(&self, p: Point) -> i32 {
        let st = self.lock();
        match st.idx(p) {
            Some(i) => st.cells[i].distance,
            None => crate::cell::UNREACHABLE,
        }
    }

    /// Whether the cell at `p` has been finalized by the current run.
    pub fn finalized_at(&self, p: Point) -> bool {
        let st = self.lock();
        st.idx(p).is_some_and(|i| st.cells[i].finalized)
    }

    /// The precomputed usable neighbors of `p`.
    ///
    /// Reflects the adjacency as of the last
    /// [`recompute_adjacency`](Grid::recompute_adjacency) call, not the
    /// current obstacle flags.
    pub fn neighbors_of(&self, p: Point) -> Vec<Point> {
        let st = self.lock();
        match st.idx(p) {
            Some(i) => st.cells[i].neighbors.iter().map(|&n| st.cells[n].pos).collect(),
            None => Vec::new(),
        }
    }

    /// The designated start cell, if any.
    pub fn start(&self) -> Option<Point> {
        let st = self.lock();
        st.start.map(|i| st.cells[i].pos)
    }

    /// The designated goal cell, if any.
    pub fn goal(&self) -> Option<Point> {
        let st = self.lock();
        st.goal.map(|i| st.cells[i].pos)
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Set or clear the obstacle flag at `p`.
    ///
    /// Refused (returns `false`) out of bounds and on the start/goal
    /// cells: obstacle and endpoint roles are mutually exclusive.
    pub fn set_obstacle(&self, p: Point, obstacle: bool) -> bool {
        let mut st = self.lock();
        let Some(i) = st.idx(p) else {
            return false;
        };
        if st.start == Some(i) || st.goal == Some(i) {
            return false;
        }
        st.cells[i].obstacle = obstacle;
        st.cells[i].state = if obstacle {
            CellState::Obstacle
        } else {
            CellState::Default
        };
        true
    }

    /// Flip the obstacle flag at `p`. Same refusal rules as
    /// [`set_obstacle`](Grid::set_obstacle).
    pub fn toggle_obstacle(&self, p: Point) -> bool {
        let obstacle = !self.is_obstacle(p);
        self.set_obstacle(p, obstacle)
    }

    /// Designate `p` as the start cell.
    ///
    /// Refused on obstacles, on the goal cell, and out of bounds. Moving
    /// the start restores the previous start cell to its default state.
    pub fn set_start(&self, p: Point) -> bool {
        let mut st = self.lock();
        let Some(i) = st.idx(p) else {
            return false;
        };
        if st.cells[i].obstacle || st.goal == Some(i) {
            return false;
        }
        if let Some(old) = st.start.take() {
            st.cells[old].state = CellState::Default;
        }
        st.start = Some(i);
        st.cells[i].state = CellState::Start;
        true
    }

    /// Designate `p` as the goal cell. Mirror of
    /// [`set_start`](Grid::set_start).
    pub fn set_goal(&self, p: Point) -> bool {
        let mut st = self.lock();
        let Some(i) = st.idx(p) else {
            return false;
        };
        if st.cells[i].obstacle || st.start == Some(i) {
            return false;
        }
        if let Some(old) = st.goal.take() {
            st.cells[old].state = CellState::Default;
        }
        st.goal = Some(i);
        st.cells[i].state = CellState::Goal;
        true
    }

    /// Drop both endpoint designations, restoring their cells' default
    /// state. Obstacle generation calls this: a fresh layout invalidates
    /// previously chosen endpoints.
    pub fn clear_start_goal(&self) {
        let mut st = self.lock();
        if let Some(i) = st.start.take() {
            st.cells[i].state = CellState::Default;
        }
        if let Some(i) = st.goal.take() {
            st.cells[i].state = CellState::Default;
        }
    }

    // -----------------------------------------------------------------------
    // Bulk operations
    // -----------------------------------------------------------------------

    /// Rebuild every cell's neighbor list as its in-bounds, non-obstacle
    /// cardinal neighbors.
    ///
    /// Must be called after any obstacle mutation and before a search
    /// run; a search over stale adjacency would walk through fresh walls
    /// or avoid removed ones.
    pub fn recompute_adjacency(&self) {
        let mut st = self.lock();
        let blocked: Vec<bool> = st.cells.iter().map(|c| c.obstacle).collect();
        let (w, h) = (st.width, st.height);
        for i in 0..st.cells.len() {
            let p = st.point(i);
            let mut neighbors = Vec::with_capacity(4);
            for n in p.neighbors_4() {
                if n.x < 0 || n.y < 0 || n.x >= w || n.y >= h {
                    continue;
                }
                let ni = (n.y * w + n.x) as usize;
                if !blocked[ni] {
                    neighbors.push(ni);
                }
            }
            st.cells[i].neighbors = neighbors;
        }
    }

    /// Clear the previous run's traces so the same layout can be
    /// searched again.
    ///
    /// Search bookkeeping (distance/predecessor/finalized) is cleared on
    /// every cell, since a stale distance on an endpoint would corrupt
    /// the next run. Display state is restored to default only on plain
    /// cells: obstacles, start and goal keep their markers.
    pub fn reset_search_state(&self) {
        let mut st = self.lock();
        let (start, goal) = (st.start, st.goal);
        for (i, cell) in st.cells.iter_mut().enumerate() {
            cell.clear_bookkeeping();
            if cell.obstacle || start == Some(i) || goal == Some(i) {
                continue;
            }
            cell.state = CellState::Default;
        }
    }

    /// Restore every cell to its default state, clearing obstacle flags
    /// and both endpoint designations. Used when starting a fresh
    /// layout.
    pub fn reset_all(&self) {
        let mut st = self.lock();
        for cell in st.cells.iter_mut() {
            cell.clear_bookkeeping();
            cell.obstacle = false;
            cell.state = CellState::Default;
            cell.neighbors.clear();
        }
        st.start = None;
        st.goal = None;
    }

    // -----------------------------------------------------------------------
    // Search-facing mutators
    // -----------------------------------------------------------------------

    /// Record an improved tentative distance and its predecessor.
    /// Out-of-bounds writes are ignored.
    pub fn set_tentative(&self, p: Point, distance: i32, predecessor: Option<Point>) {
        let mut st = self.lock();
        let Some(i) = st.idx(p) else {
            return;
        };
        let pred = predecessor.and_then(|q| st.idx(q));
        st.cells[i].distance = distance;
        st.cells[i].predecessor = pred;
    }

    /// Mark the cell at `p` finalized: its shortest distance will not
    /// change for the rest of the run.
    pub fn finalize(&self, p: Point) {
        let mut st = self.lock();
        if let Some(i) = st.idx(p) {
            st.cells[i].finalized = true;
        }
    }

    /// Overwrite the display state at `p`. Out-of-bounds writes are
    /// ignored.
    pub fn set_state(&self, p: Point, state: CellState) {
        let mut st = self.lock();
        if let Some(i) = st.idx(p) {
            st.cells[i].state = state;
        }
    }

    // -----------------------------------------------------------------------
    // Presentation projection
    // -----------------------------------------------------------------------

    /// Edge length of a rendered cell, in pixels.
    pub fn cell_px(&self) -> i32 {
        self.lock().cell_px
    }

    /// Top-left pixel of the cell at `p`, recomputed on demand from the
    /// coordinates.
    pub fn cell_origin(&self, p: Point) -> Option<(i32, i32)> {
        let st = self.lock();
        st.idx(p)?;
        Some((p.x * st.cell_px, p.y * st.cell_px))
    }

    /// Map a window pixel coordinate to the cell under it.
    ///
    /// Returns `None` when the pixel falls outside the grid's rendered
    /// area, e.g. on a side panel to the right of the grid.
    pub fn pixel_to_cell(&self, x: i32, y: i32) -> Option<Point> {
        let st = self.lock();
        if x < 0 || y < 0 {
            return None;
        }
        let p = Point::new(x / st.cell_px, y / st.cell_px);
        st.idx(p)?;
        Some(p)
    }

    /// Copy out `(position, display state)` for every cell, row-major.
    /// This is the renderer's draw-pass input.
    pub fn render_snapshot(&self) -> Vec<(Point, CellState)> {
        let st = self.lock();
        st.cells.iter().map(|c| (c.pos, c.state)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::UNREACHABLE;

    #[test]
    fn bounds_checked_lookup() {
        let g = Grid::new(4, 3);
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
        assert_eq!(g.len(), 12);
        assert!(g.at(Point::new(3, 2)).is_some());
        assert!(g.at(Point::new(4, 0)).is_none());
        assert!(g.at(Point::new(0, 3)).is_none());
        assert!(g.at(Point::new(-1, 0)).is_none());
    }

    #[test]
    fn zero_size_grid_is_inert() {
        let g = Grid::new(0, 5);
        assert!(g.is_empty());
        assert!(g.at(Point::ZERO).is_none());
        assert!(!g.set_start(Point::ZERO));
        assert!(g.pixel_to_cell(0, 0).is_none());
        g.recompute_adjacency();
        g.reset_all();
    }

    #[test]
    fn clones_share_the_buffer() {
        let g = Grid::new(5, 5);
        let view = g.clone();
        assert!(g.set_obstacle(Point::new(2, 2), true));
        assert!(view.is_obstacle(Point::new(2, 2)));
    }

    #[test]
    fn obstacle_refused_on_endpoints() {
        let g = Grid::new(5, 5);
        assert!(g.set_start(Point::new(0, 0)));
        assert!(g.set_goal(Point::new(4, 4)));
        assert!(!g.set_obstacle(Point::new(0, 0), true));
        assert!(!g.toggle_obstacle(Point::new(4, 4)));
        assert!(!g.is_obstacle(Point::new(0, 0)));
    }

    #[test]
    fn endpoints_refused_on_obstacles_and_each_other() {
        let g = Grid::new(5, 5);
        assert!(g.set_obstacle(Point::new(1, 1), true));
        assert!(!g.set_start(Point::new(1, 1)));
        assert!(!g.set_goal(Point::new(1, 1)));
        assert!(g.set_start(Point::new(0, 0)));
        assert!(!g.set_goal(Point::new(0, 0)));
        assert_eq!(g.goal(), None);
    }

    #[test]
    fn moving_start_restores_previous_cell() {
        let g = Grid::new(5, 5);
        assert!(g.set_start(Point::new(0, 0)));
        assert!(g.set_start(Point::new(2, 2)));
        assert_eq!(g.state_at(Point::new(0, 0)), Some(CellState::Default));
        assert_eq!(g.state_at(Point::new(2, 2)), Some(CellState::Start));
        assert_eq!(g.start(), Some(Point::new(2, 2)));
    }

    #[test]
    fn adjacency_tracks_obstacle_toggles() {
        let g = Grid::new(3, 3);
        g.recompute_adjacency();
        let center = Point::new(1, 1);
        assert_eq!(g.neighbors_of(center).len(), 4);
        // Corner cell has two neighbors.
        assert_eq!(g.neighbors_of(Point::new(0, 0)).len(), 2);

        g.set_obstacle(Point::new(1, 0), true);
        g.recompute_adjacency();
        let n = g.neighbors_of(center);
        assert_eq!(n.len(), 3);
        assert!(!n.contains(&Point::new(1, 0)));
        // No cell anywhere lists the obstacle as a neighbor.
        for y in 0..3 {
            for x in 0..3 {
                assert!(!g.neighbors_of(Point::new(x, y)).contains(&Point::new(1, 0)));
            }
        }

        g.set_obstacle(Point::new(1, 0), false);
        g.recompute_adjacency();
        assert_eq!(g.neighbors_of(center).len(), 4);
    }

    #[test]
    fn reset_search_state_preserves_layout() {
        let g = Grid::new(4, 4);
        g.set_obstacle(Point::new(1, 1), true);
        g.set_start(Point::new(0, 0));
        g.set_goal(Point::new(3, 3));
        g.set_tentative(Point::new(2, 2), 4, Some(Point::new(2, 1)));
        g.finalize(Point::new(2, 2));
        g.set_state(Point::new(2, 2), CellState::Visited);
        g.set_tentative(Point::new(3, 3), 6, Some(Point::new(2, 3)));

        g.reset_search_state();

        let cell = g.at(Point::new(2, 2)).unwrap();
        assert_eq!(cell.state, CellState::Default);
        assert_eq!(cell.distance, UNREACHABLE);
        assert_eq!(cell.predecessor, None);
        assert!(!cell.finalized);
        // Endpoint bookkeeping cleared too, markers kept.
        let goal = g.at(Point::new(3, 3)).unwrap();
        assert_eq!(goal.state, CellState::Goal);
        assert_eq!(goal.distance, UNREACHABLE);
        // Obstacles and endpoints untouched otherwise.
        assert!(g.is_obstacle(Point::new(1, 1)));
        assert_eq!(g.start(), Some(Point::new(0, 0)));
        assert_eq!(g.goal(), Some(Point::new(3, 3)));
    }

    #[test]
    fn reset_all_clears_everything() {
        let g = Grid::new(4, 4);
        g.set_obstacle(Point::new(1, 1), true);
        g.set_start(Point::new(0, 0));
        g.set_goal(Point::new(3, 3));
        g.reset_all();
        assert!(!g.is_obstacle(Point::new(1, 1)));
        assert_eq!(g.start(), None);
        assert_eq!(g.goal(), None);
        for (_, state) in g.render_snapshot() {
            assert_eq!(state, CellState::Default);
        }
    }

    #[test]
    fn pixel_mapping_excludes_panel_area() {
        let g = Grid::with_cell_px(10, 6, 12);
        assert_eq!(g.pixel_to_cell(0, 0), Some(Point::ZERO));
        assert_eq!(g.pixel_to_cell(25, 13), Some(Point::new(2, 1)));
        // Right of the grid's 120 rendered pixels: a side panel.
        assert_eq!(g.pixel_to_cell(120, 0), None);
        assert_eq!(g.pixel_to_cell(500, 30), None);
        assert_eq!(g.pixel_to_cell(-1, 0), None);
        assert_eq!(g.pixel_to_cell(0, 72), None);
    }

    #[test]
    fn cell_origin_is_derived_from_coordinates() {
        let g = Grid::with_cell_px(10, 6, 12);
        assert_eq!(g.cell_origin(Point::new(2, 1)), Some((24, 12)));
        assert_eq!(g.cell_origin(Point::new(10, 0)), None);
    }

    #[test]
    fn render_snapshot_is_row_major() {
        let g = Grid::new(3, 2);
        g.set_obstacle(Point::new(1, 0), true);
        let snap = g.render_snapshot();
        assert_eq!(snap.len(), 6);
        assert_eq!(snap[0].0, Point::new(0, 0));
        assert_eq!(snap[1], (Point::new(1, 0), CellState::Obstacle));
        assert_eq!(snap[5].0, Point::new(2, 1));
    }
}
