//! **pathgrid-core** — cell arena and geometry for the pathgrid toolkit.
//!
//! This crate holds the mutable search space: a rectangular arena of
//! cells with obstacle flags, per-run search bookkeeping, and a
//! display-state tag for the rendering side. The grid is a shared-buffer
//! type: cloning it is cheap and every clone views the same cells, so a
//! search worker and a render/input thread can hold it at the same time.

pub mod cell;
pub mod geom;
pub mod grid;

pub use cell::{CellInfo, CellState, UNREACHABLE};
pub use geom::{Point, manhattan};
pub use grid::{DEFAULT_CELL_PX, Grid};
