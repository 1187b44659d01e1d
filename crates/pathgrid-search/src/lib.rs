//! Interactive shortest-path search for pathgrid.
//!
//! The engine runs uniform-cost shortest path (Dijkstra with unit edge
//! weights) over a [`pathgrid_core::Grid`], emitting per-cell progress
//! notifications and polling a cooperative pause/cancel token so a
//! foreground thread can steer a run mid-flight:
//!
//! - [`SearchEngine::run`] — shortest path from start to goal
//! - [`SearchEngine::explore`] — exhaustive expansion with no goal
//! - [`SearchEngine::reconstruct`] — walk predecessor links and mark the
//!   winning path
//!
//! Every blocking point inside a run (pause wait, pacing sleep) is
//! bounded by [`POLL_INTERVAL`], so cancellation is observed within one
//! interval.

pub mod control;
pub mod engine;
pub mod sink;

pub use control::{POLL_INTERVAL, SearchControl};
pub use engine::{Pacing, SearchEngine, SearchOutcome};
pub use sink::{ChannelSink, FnSink, NullSink, ProgressEvent, ProgressSink};
