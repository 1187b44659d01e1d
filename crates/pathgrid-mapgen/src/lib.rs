//! Maze and obstacle-layout generators for pathgrid.
//!
//! Two carving algorithms build structured mazes over a 2-cell lattice
//! (odd coordinates are rooms, even coordinates are the walls between
//! them, and the outermost ring always stays solid), and a scatter
//! generator places obstacles independently at random:
//!
//! - [`carve_backtracker`] — depth-first carving with backtracking
//! - [`carve_frontier`] — frontier growth (randomized spanning tree)
//! - [`scatter`] — independent 30% obstacle scatter
//!
//! Both carvers produce a *perfect* maze: exactly one route between any
//! two rooms. [`generate`] follows them with [`punch_openings`] to break
//! that property, since a maze with loops makes a far better
//! shortest-path demonstration than one with a single route.
//!
//! Generation always clears the grid's designated start/goal, since a
//! fresh layout invalidates them, and leaves adjacency stale; callers
//! run `recompute_adjacency` before searching.

use pathgrid_core::{Grid, Point};
use rand::{Rng, RngExt};

/// Probability that a cell becomes an obstacle under
/// [`Algorithm::Scatter`].
const SCATTER_DENSITY: f64 = 0.3;

/// Room-to-room jumps on the 2-cell lattice.
const JUMPS: [(i32, i32); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// Obstacle-layout algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Depth-first carving with backtracking, then random openings.
    Backtracker,
    /// Frontier growth, then random openings.
    Frontier,
    /// Independent random scatter; no solvability guarantee.
    Scatter,
}

/// Fill the grid's obstacle flags using `algorithm`.
///
/// The grid is fully reset first (including start/goal, which a new
/// layout invalidates). Adjacency is left stale on purpose: callers
/// recompute it once they are done editing.
pub fn generate(grid: &Grid, algorithm: Algorithm, rng: &mut impl Rng) {
    grid.reset_all();
    match algorithm {
        Algorithm::Backtracker => {
            fill_obstacles(grid);
            carve_backtracker(grid, rng);
            punch_openings(grid, default_opening_count(grid), rng);
        }
        Algorithm::Frontier => {
            fill_obstacles(grid);
            carve_frontier(grid, rng);
            punch_openings(grid, default_opening_count(grid), rng);
        }
        Algorithm::Scatter => scatter(grid, rng),
    }
}

/// Opening attempts used by [`generate`]: one per four cells, with a
/// floor so tiny grids still get loops.
pub fn default_opening_count(grid: &Grid) -> usize {
    ((grid.width() * grid.height()) as usize / 4).max(20)
}

fn fill_obstacles(grid: &Grid) {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            grid.set_obstacle(Point::new(x, y), true);
        }
    }
}

/// Whether `p` is a lattice room candidate: in bounds with the 1-cell
/// border preserved on all sides.
fn in_lattice(p: Point, w: i32, h: i32) -> bool {
    p.x >= 1 && p.y >= 1 && p.x < w - 1 && p.y < h - 1
}

/// Carve a spanning passage tree with an explicit stack.
///
/// Starts at the grid center snapped to odd/odd parity. Each step opens
/// the top-of-stack room, picks an unvisited room two cells away at
/// random, opens the single wall cell between them and descends;
/// dead ends pop the stack. When the stack empties every reachable
/// odd-lattice room has been visited, so the open cells form a spanning
/// tree over the lattice.
///
/// Expects a grid of solid obstacles; grids smaller than 3×3 have no
/// carvable lattice and are left alone.
pub fn carve_backtracker(grid: &Grid, rng: &mut impl Rng) {
    let (w, h) = (grid.width(), grid.height());
    if w < 3 || h < 3 {
        return;
    }

    let mut visited = vec![false; grid.len()];
    let mut stack = vec![odd_center(w, h)];

    while let Some(&current) = stack.last() {
        let ci = (current.y * w + current.x) as usize;
        if !visited[ci] {
            visited[ci] = true;
            grid.set_obstacle(current, false);
        }

        let mut candidates = [Point::ZERO; 4];
        let mut n = 0;
        for (dx, dy) in JUMPS {
            let room = current.shift(dx, dy);
            if in_lattice(room, w, h) && !visited[(room.y * w + room.x) as usize] {
                candidates[n] = room;
                n += 1;
            }
        }

        if n == 0 {
            stack.pop();
            continue;
        }
        let room = candidates[rng.random_range(0..n)];
        // Open the wall cell midway between the two rooms.
        let wall = Point::new((current.x + room.x) / 2, (current.y + room.y) / 2);
        grid.set_obstacle(wall, false);
        stack.push(room);
    }
}

/// Carve a randomized spanning tree by frontier growth.
///
/// Opens a random odd/odd room, then keeps a list of (wall, room) pairs
/// on the frontier of the carved region; each round removes a random
/// pair and, if the far room is still solid, opens both cells and adds
/// that room's own frontier pairs. Stops when the frontier is
/// exhausted, which covers the whole lattice.
///
/// Expects a grid of solid obstacles; grids smaller than 3×3 are left
/// alone.
pub fn carve_frontier(grid: &Grid, rng: &mut impl Rng) {
    let (w, h) = (grid.width(), grid.height());
    if w < 3 || h < 3 {
        return;
    }

    let seed = random_odd(w, h, rng);
    grid.set_obstacle(seed, false);

    let mut frontier: Vec<(Point, Point)> = Vec::new();
    push_frontier(seed, w, h, &mut frontier);

    while !frontier.is_empty() {
        let picked = rng.random_range(0..frontier.len());
        let (wall, room) = frontier.swap_remove(picked);
        // The room may have been opened through another wall since the
        // pair was queued.
        if !grid.is_obstacle(room) {
            continue;
        }
        grid.set_obstacle(wall, false);
        grid.set_obstacle(room, false);
        push_frontier(room, w, h, &mut frontier);
    }
}

fn push_frontier(from: Point, w: i32, h: i32, frontier: &mut Vec<(Point, Point)>) {
    for (dx, dy) in JUMPS {
        let room = from.shift(dx, dy);
        if in_lattice(room, w, h) {
            frontier.push((from.shift(dx / 2, dy / 2), room));
        }
    }
}

fn odd_center(w: i32, h: i32) -> Point {
    let mut p = Point::new(w / 2, h / 2);
    if p.x % 2 == 0 {
        p.x -= 1;
    }
    if p.y % 2 == 0 {
        p.y -= 1;
    }
    p
}

fn random_odd(w: i32, h: i32, rng: &mut impl Rng) -> Point {
    let ox = rng.random_range(0..(w - 1) / 2);
    let oy = rng.random_range(0..(h - 1) / 2);
    Point::new(ox * 2 + 1, oy * 2 + 1)
}

/// Convert random non-border obstacle cells into passages.
///
/// Each of the `attempts` draws picks a random non-border coordinate and
/// opens it if it is currently an obstacle, introducing loops and
/// alternative routes into a perfect maze. The border ring is never
/// touched.
pub fn punch_openings(grid: &Grid, attempts: usize, rng: &mut impl Rng) {
    let (w, h) = (grid.width(), grid.height());
    if w < 3 || h < 3 {
        return;
    }
    for _ in 0..attempts {
        let p = Point::new(rng.random_range(1..w - 1), rng.random_range(1..h - 1));
        if grid.is_obstacle(p) {
            grid.set_obstacle(p, false);
        }
    }
}

/// Mark each cell as an obstacle independently with 30% probability.
///
/// No structural guarantee: the layout may disconnect any pair of
/// cells, and callers must tolerate a no-path result.
pub fn scatter(grid: &Grid, rng: &mut impl Rng) {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            grid.set_obstacle(Point::new(x, y), rng.random_bool(SCATTER_DENSITY));
        }
    }
}

/// Count passage cells reachable from `from` over cardinal moves.
///
/// Iterative flood fill over the current obstacle flags, independent of
/// any precomputed adjacency. Returns 0 if `from` is out of bounds or an
/// obstacle.
pub fn reachable_count(grid: &Grid, from: Point) -> usize {
    let w = grid.width();
    let h = grid.height();
    if from.x < 0 || from.y < 0 || from.x >= w || from.y >= h || grid.is_obstacle(from) {
        return 0;
    }
    let mut seen = vec![false; grid.len()];
    let mut stack = vec![from];
    seen[(from.y * w + from.x) as usize] = true;
    let mut count = 0;
    while let Some(p) = stack.pop() {
        count += 1;
        for n in p.neighbors_4() {
            if n.x < 0 || n.y < 0 || n.x >= w || n.y >= h || grid.is_obstacle(n) {
                continue;
            }
            let ni = (n.y * w + n.x) as usize;
            if !seen[ni] {
                seen[ni] = true;
                stack.push(n);
            }
        }
    }
    count
}
