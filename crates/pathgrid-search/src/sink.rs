//! Progress notifications emitted during a search run.

use std::sync::mpsc::Sender;

use pathgrid_core::{CellState, Point};

/// A single cell state change, as delivered to a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressEvent {
    pub pos: Point,
    pub state: CellState,
}

/// Receives per-cell state-change notifications from the engine.
///
/// The engine has already written the state to the grid when a
/// notification fires; sinks exist so a renderer can animate changes
/// without diffing full snapshots. Sinks must be `Send` because runs
/// execute on a worker thread.
pub trait ProgressSink: Send {
    fn on_cell(&mut self, pos: Point, state: CellState);
}

/// Sink that drops every notification. For callers that only read the
/// grid snapshot after the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_cell(&mut self, _pos: Point, _state: CellState) {}
}

/// Sink that forwards every event over an mpsc channel to the render
/// side. A disconnected receiver is ignored: progress events are
/// advisory and never fail a run.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn on_cell(&mut self, pos: Point, state: CellState) {
        let _ = self.tx.send(ProgressEvent { pos, state });
    }
}

/// Adapter turning a closure into a sink.
#[derive(Debug, Clone, Copy)]
pub struct FnSink<F>(pub F);

impl<F: FnMut(Point, CellState) + Send> ProgressSink for FnSink<F> {
    fn on_cell(&mut self, pos: Point, state: CellState) {
        (self.0)(pos, state);
    }
}
