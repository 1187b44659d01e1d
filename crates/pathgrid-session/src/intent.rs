//! Discrete intents from the input collaborator.

use pathgrid_core::Point;
use pathgrid_mapgen::Algorithm;

/// Semantic actions the input layer may request.
///
/// Each variant maps 1:1 onto one grid or runner operation; the core
/// performs no raw input decoding. Pixel coordinates are resolved by
/// the input layer itself via
/// [`Grid::pixel_to_cell`](pathgrid_core::Grid::pixel_to_cell) before an
/// intent is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Intent {
    /// Designate the start cell.
    SetStart(Point),
    /// Designate the goal cell.
    SetGoal(Point),
    /// Flip a cell between passage and obstacle.
    ToggleObstacle(Point),
    /// Replace the obstacle layout with a generated one.
    Generate(Algorithm),
    /// Launch a search run on the worker thread.
    StartSearch,
    /// Pause or resume the in-flight run.
    TogglePause,
    /// Hard-stop the in-flight run.
    CancelSearch,
    /// Clear search visuals, keeping layout and endpoints.
    ClearPath,
    /// Reset the grid completely.
    ClearAll,
}
