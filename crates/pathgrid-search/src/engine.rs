//! Uniform-cost shortest-path search with incremental visualization.

use std::collections::BinaryHeap;
use std::time::Duration;

use pathgrid_core::{CellState, Grid, Point};

use crate::control::SearchControl;
use crate::sink::ProgressSink;

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Visualization pacing: sleep `delay` after every `batch` processed
/// cells.
///
/// Purely a presentation concern: it never affects which cells are
/// visited or in what order, and the sleeps go through
/// [`SearchControl::sleep`] so cancellation stays responsive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pacing {
    pub batch: usize,
    pub delay: Duration,
}

impl Pacing {
    /// No delays at all.
    pub const INSTANT: Self = Self {
        batch: 1,
        delay: Duration::ZERO,
    };
    /// Quick animation: 2 ms per 25 cells.
    pub const FAST: Self = Self {
        batch: 25,
        delay: Duration::from_millis(2),
    };
    /// Comfortable animation: 10 ms per 5 cells.
    pub const NORMAL: Self = Self {
        batch: 5,
        delay: Duration::from_millis(10),
    };
    /// Step-by-step: 50 ms per cell.
    pub const SLOW: Self = Self {
        batch: 1,
        delay: Duration::from_millis(50),
    };
}

impl Default for Pacing {
    fn default() -> Self {
        Self::NORMAL
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchOutcome {
    /// The goal was finalized; predecessor links describe a shortest
    /// path.
    PathFound,
    /// The reachable region was exhausted without meeting the goal, or a
    /// precondition (endpoints set, distinct, passable) failed.
    NoPath,
    /// Cancellation was observed; partial visitation stays on the grid.
    Cancelled,
}

// ---------------------------------------------------------------------------
// Queue entry
// ---------------------------------------------------------------------------

/// Min-ordered queue entry: distance first, then the cell's creation
/// index, so equal-distance cells pop in a stable, reproducible order
/// regardless of timing or memory layout.
#[derive(Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    dist: i32,
    cell: usize,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (a max-heap) pops the smallest first.
        other
            .dist
            .cmp(&self.dist)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// How one expansion loop ended.
enum Expansion {
    ReachedGoal,
    Exhausted(usize),
    Cancelled,
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// Runs uniform-cost shortest-path searches over a [`Grid`].
///
/// The engine keeps no state between invocations; the priority queue
/// and the eligibility set live on the stack of each call, while
/// per-cell bookkeeping (distance, predecessor, finalized) is written
/// into the grid so the controller can inspect and reset it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine {
    pacing: Pacing,
}

impl SearchEngine {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Search for a shortest path from `start` to `goal`.
    ///
    /// Preconditions: both endpoints in bounds, distinct, and passable.
    /// A violation returns [`SearchOutcome::NoPath`] without touching
    /// the grid. Otherwise all previous search traces are cleared,
    /// adjacency is recomputed, and the expansion loop runs until the
    /// goal is finalized, the queue empties, or `control` reports
    /// cancellation.
    pub fn run(
        &self,
        grid: &Grid,
        start: Point,
        goal: Point,
        sink: &mut dyn ProgressSink,
        control: &SearchControl,
    ) -> SearchOutcome {
        if start == goal
            || !grid.contains(start)
            || !grid.contains(goal)
            || grid.is_obstacle(start)
            || grid.is_obstacle(goal)
        {
            return SearchOutcome::NoPath;
        }
        match self.expand(grid, start, Some(goal), sink, control) {
            Expansion::ReachedGoal => SearchOutcome::PathFound,
            Expansion::Exhausted(_) => SearchOutcome::NoPath,
            Expansion::Cancelled => SearchOutcome::Cancelled,
        }
    }

    /// Expand from `start` until the whole reachable region is
    /// finalized, with no goal to stop at.
    ///
    /// Returns the number of finalized cells, or `None` if the run was
    /// cancelled. An out-of-bounds or blocked `start` finalizes nothing.
    pub fn explore(
        &self,
        grid: &Grid,
        start: Point,
        sink: &mut dyn ProgressSink,
        control: &SearchControl,
    ) -> Option<usize> {
        if !grid.contains(start) || grid.is_obstacle(start) {
            return Some(0);
        }
        match self.expand(grid, start, None, sink, control) {
            Expansion::Exhausted(count) => Some(count),
            Expansion::Cancelled => None,
            // Unreachable without a goal, but harmless to map.
            Expansion::ReachedGoal => Some(0),
        }
    }

    fn expand(
        &self,
        grid: &Grid,
        start: Point,
        goal: Option<Point>,
        sink: &mut dyn ProgressSink,
        control: &SearchControl,
    ) -> Expansion {
        grid.reset_search_state();
        grid.recompute_adjacency();

        let width = grid.width();
        let flat = |p: Point| (p.y * width + p.x) as usize;

        grid.set_tentative(start, 0, None);

        let mut open: BinaryHeap<QueueEntry> = BinaryHeap::new();
        let mut eligible = vec![false; grid.len()];
        open.push(QueueEntry {
            dist: 0,
            cell: flat(start),
        });
        eligible[flat(start)] = true;

        let mut processed = 0usize;
        let mut finalized = 0usize;

        loop {
            if control.should_cancel() {
                return Expansion::Cancelled;
            }
            if control.should_pause() && control.wait_while_paused() {
                return Expansion::Cancelled;
            }

            let Some(entry) = open.pop() else {
                break;
            };

            // A cell already superseded by a shorter distance is a stale
            // duplicate: discard without counting it as processed.
            if !eligible[entry.cell] {
                continue;
            }
            eligible[entry.cell] = false;

            let current = Point::new(entry.cell as i32 % width, entry.cell as i32 / width);
            grid.finalize(current);
            finalized += 1;

            if goal == Some(current) {
                return Expansion::ReachedGoal;
            }

            if current != start {
                grid.set_state(current, CellState::Visited);
                sink.on_cell(current, CellState::Visited);
            }

            let dist = grid.distance_at(current);
            for neighbor in grid.neighbors_of(current) {
                if grid.finalized_at(neighbor) {
                    continue;
                }
                let candidate = dist + 1;
                if candidate >= grid.distance_at(neighbor) {
                    continue;
                }
                grid.set_tentative(neighbor, candidate, Some(current));
                let ni = flat(neighbor);
                if !eligible[ni] {
                    eligible[ni] = true;
                    open.push(QueueEntry {
                        dist: candidate,
                        cell: ni,
                    });
                    if goal != Some(neighbor) {
                        grid.set_state(neighbor, CellState::Frontier);
                        sink.on_cell(neighbor, CellState::Frontier);
                    }
                }
            }

            processed += 1;
            if !self.pacing.delay.is_zero()
                && processed % self.pacing.batch.max(1) == 0
                && control.sleep(self.pacing.delay)
            {
                return Expansion::Cancelled;
            }
        }

        Expansion::Exhausted(finalized)
    }

    /// Walk predecessor links from `goal` back to the start, animate the
    /// interior cells in start-to-goal order, and return the path length
    /// in steps.
    ///
    /// The goal counts toward the length, the start does not, so the
    /// result equals the number of edges traversed (the true graph
    /// distance). Interior cells are marked [`CellState::Path`]; the
    /// start and goal keep their own markers. Pause and cancel are
    /// honored before each emitted cell; cancellation stops the
    /// animation but still returns the full computed length, and the
    /// partial coloring is deliberately left in place.
    pub fn reconstruct(
        &self,
        grid: &Grid,
        goal: Point,
        sink: &mut dyn ProgressSink,
        control: &SearchControl,
    ) -> usize {
        // Chain from goal back to the start; the start itself (the one
        // cell with no predecessor) is dropped from the walk.
        let mut chain = vec![goal];
        let mut current = goal;
        while let Some(prev) = grid.at(current).and_then(|c| c.predecessor) {
            current = prev;
            chain.push(prev);
        }
        chain.pop();
        let length = chain.len();
        // An unreached goal has no predecessor chain; nothing to walk.
        if length == 0 {
            return 0;
        }

        // chain[0] is the goal; animate the interior from the start
        // outward and leave the goal marker alone.
        for &p in chain[1..].iter().rev() {
            if control.should_cancel() {
                return length;
            }
            if control.should_pause() && control.wait_while_paused() {
                return length;
            }
            grid.set_state(p, CellState::Path);
            sink.on_cell(p, CellState::Path);
            if !self.pacing.delay.is_zero() && control.sleep(self.pacing.delay * 2) {
                return length;
            }
        }
        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{FnSink, NullSink};
    use pathgrid_core::manhattan;

    fn engine() -> SearchEngine {
        SearchEngine::new(Pacing::INSTANT)
    }

    /// 5×5 grid with a wall across row 2, single gap at x = 3.
    fn gap_grid() -> Grid {
        let g = Grid::new(5, 5);
        for x in 0..5 {
            if x != 3 {
                assert!(g.set_obstacle(Point::new(x, 2), true));
            }
        }
        g
    }

    #[test]
    fn optimal_length_around_a_gap() {
        let g = gap_grid();
        let start = Point::new(0, 0);
        let goal = Point::new(0, 4);
        let outcome = engine().run(&g, start, goal, &mut NullSink, &SearchControl::new());
        assert_eq!(outcome, SearchOutcome::PathFound);
        // Route must detour through the gap at (3, 2): 3 right, 4 down,
        // 3 left = 10 steps instead of the walled-off 4.
        let len = engine().reconstruct(&g, goal, &mut NullSink, &SearchControl::new());
        assert_eq!(len, 10);
        assert_eq!(g.distance_at(goal), 10);
    }

    #[test]
    fn empty_grid_length_is_manhattan() {
        let g = Grid::new(10, 10);
        let start = Point::new(0, 0);
        let goal = Point::new(9, 9);
        let outcome = engine().run(&g, start, goal, &mut NullSink, &SearchControl::new());
        assert_eq!(outcome, SearchOutcome::PathFound);
        let len = engine().reconstruct(&g, goal, &mut NullSink, &SearchControl::new());
        assert_eq!(len, manhattan(start, goal) as usize);
        assert_eq!(len, 18);
    }

    #[test]
    fn explore_finalizes_whole_grid() {
        let g = Grid::new(10, 10);
        let count = engine()
            .explore(&g, Point::ZERO, &mut NullSink, &SearchControl::new())
            .unwrap();
        assert_eq!(count, 100);
    }

    #[test]
    fn explore_respects_obstacles() {
        let g = gap_grid();
        // Row 2 holds 4 obstacles; everything else connects through the
        // gap.
        let count = engine()
            .explore(&g, Point::ZERO, &mut NullSink, &SearchControl::new())
            .unwrap();
        assert_eq!(count, 21);
    }

    #[test]
    fn enclosed_goal_yields_no_path() {
        let g = Grid::new(7, 7);
        let goal = Point::new(5, 5);
        for n in goal.neighbors_4() {
            assert!(g.set_obstacle(n, true));
        }
        let outcome = engine().run(&g, Point::ZERO, goal, &mut NullSink, &SearchControl::new());
        assert_eq!(outcome, SearchOutcome::NoPath);
        assert!(!g.finalized_at(goal));
    }

    #[test]
    fn precondition_violations_mutate_nothing() {
        let g = Grid::new(5, 5);
        g.set_obstacle(Point::new(2, 2), true);
        let ctl = SearchControl::new();
        // Same endpoint.
        assert_eq!(
            engine().run(&g, Point::ZERO, Point::ZERO, &mut NullSink, &ctl),
            SearchOutcome::NoPath
        );
        // Out of bounds.
        assert_eq!(
            engine().run(&g, Point::ZERO, Point::new(9, 9), &mut NullSink, &ctl),
            SearchOutcome::NoPath
        );
        // Obstacle endpoint.
        assert_eq!(
            engine().run(&g, Point::ZERO, Point::new(2, 2), &mut NullSink, &ctl),
            SearchOutcome::NoPath
        );
        for p in [Point::ZERO, Point::new(1, 1), Point::new(4, 4)] {
            assert!(!g.finalized_at(p));
        }
    }

    #[test]
    fn visit_sequence_is_deterministic() {
        let run_once = || {
            let g = gap_grid();
            let mut events = Vec::new();
            let mut sink = FnSink(|pos, state| events.push((pos, state)));
            let outcome = engine().run(
                &g,
                Point::new(0, 0),
                Point::new(4, 4),
                &mut sink,
                &SearchControl::new(),
            );
            assert_eq!(outcome, SearchOutcome::PathFound);
            events
        };
        assert_eq!(run_once(), run_once());
    }

    #[test]
    fn rerun_after_reset_matches_first_run() {
        let g = gap_grid();
        let start = Point::new(0, 0);
        let goal = Point::new(0, 4);
        let ctl = SearchControl::new();

        assert_eq!(
            engine().run(&g, start, goal, &mut NullSink, &ctl),
            SearchOutcome::PathFound
        );
        let first = engine().reconstruct(&g, goal, &mut NullSink, &ctl);

        g.reset_search_state();
        assert_eq!(
            engine().run(&g, start, goal, &mut NullSink, &ctl),
            SearchOutcome::PathFound
        );
        let second = engine().reconstruct(&g, goal, &mut NullSink, &ctl);
        assert_eq!(first, second);
        // Layout untouched by the reset.
        assert!(g.is_obstacle(Point::new(0, 2)));
    }

    #[test]
    fn goal_keeps_its_marker() {
        let g = Grid::new(4, 4);
        assert!(g.set_start(Point::new(0, 0)));
        assert!(g.set_goal(Point::new(3, 3)));
        let ctl = SearchControl::new();
        let outcome = engine().run(&g, Point::new(0, 0), Point::new(3, 3), &mut NullSink, &ctl);
        assert_eq!(outcome, SearchOutcome::PathFound);
        engine().reconstruct(&g, Point::new(3, 3), &mut NullSink, &ctl);
        assert_eq!(g.state_at(Point::new(3, 3)), Some(CellState::Goal));
        assert_eq!(g.state_at(Point::new(0, 0)), Some(CellState::Start));
        // Interior path cells are marked.
        let snapshot = g.render_snapshot();
        let path_cells = snapshot
            .iter()
            .filter(|(_, s)| *s == CellState::Path)
            .count();
        assert_eq!(path_cells, 5);
    }

    #[test]
    fn each_cell_visited_at_most_once() {
        let g = gap_grid();
        let mut visited = Vec::new();
        let mut sink = FnSink(|pos, state| {
            if state == CellState::Visited {
                visited.push(pos);
            }
        });
        engine().run(
            &g,
            Point::new(0, 0),
            Point::new(4, 4),
            &mut sink,
            &SearchControl::new(),
        );
        let mut dedup = visited.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), visited.len());
    }

    #[test]
    fn pre_cancelled_control_stops_immediately() {
        let g = Grid::new(20, 20);
        let ctl = SearchControl::new();
        ctl.cancel();
        let mut events = 0usize;
        let mut sink = FnSink(|_, _| events += 1);
        let outcome = engine().run(&g, Point::ZERO, Point::new(19, 19), &mut sink, &ctl);
        assert_eq!(outcome, SearchOutcome::Cancelled);
        drop(sink);
        assert_eq!(events, 0);
    }

    #[test]
    fn frontier_then_visited_ordering() {
        // Every visited cell (other than the start) must have been
        // announced as frontier first.
        let g = Grid::new(6, 6);
        let start = Point::ZERO;
        let mut announced = Vec::new();
        let mut order_ok = true;
        let mut sink = FnSink(|pos, state| match state {
            CellState::Frontier => announced.push(pos),
            CellState::Visited => {
                if pos != start && !announced.contains(&pos) {
                    order_ok = false;
                }
            }
            _ => {}
        });
        engine().run(&g, start, Point::new(5, 5), &mut sink, &SearchControl::new());
        drop(sink);
        assert!(order_ok);
    }
}
