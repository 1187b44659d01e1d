//! Error values crossing the controller boundary.

use std::error::Error;
use std::fmt;

/// Why a controller request was refused.
///
/// These are ordinary negative results, not faults: the session stays
/// fully usable after any of them, and nothing here ever crosses the
/// worker boundary as a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A search run is already in flight (single-flight guard).
    Busy,
    /// Start or goal is not designated on the grid.
    MissingEndpoints,
    /// The targeted coordinate lies outside the grid.
    OutOfBounds,
    /// The edit would violate obstacle/start/goal exclusivity.
    EndpointConflict,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "a search run is already active"),
            Self::MissingEndpoints => write!(f, "start and goal must both be set"),
            Self::OutOfBounds => write!(f, "coordinate outside the grid"),
            Self::EndpointConflict => {
                write!(f, "obstacle and start/goal roles are mutually exclusive")
            }
        }
    }
}

impl Error for SessionError {}
