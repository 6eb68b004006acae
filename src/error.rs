//! Error kinds emitted by the pathfinder core, per the error handling
//! design: geometry robustness issues are recovered locally (skip, log);
//! cancellation and sink errors are surfaced to the caller.

use thiserror::Error;

/// Errors that can arise while building a [`crate::Scene`] or computing
/// propagation paths.
#[derive(Debug, Error)]
pub enum PathfinderError {
    /// Malformed polygon, degenerate wall, or a source geometry kind
    /// outside `{Point, LineString, MultiLineString}`. The offending
    /// element is skipped by the caller of the fallible builder method.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The receiver or source lies outside the scene envelope. Not fatal:
    /// the receiver simply yields no paths.
    #[error("position ({x}, {y}) is outside the scene envelope")]
    OutOfRange { x: f64, y: f64 },

    /// A side-hull perimeter exceeded the `4 * |src - rcv|` bound; the
    /// diffraction attempt for this receiver returns empty, other path
    /// kinds continue.
    #[error("side hull failed to converge within the perimeter bound")]
    NonConvergence,

    /// Cooperative cancellation was observed; partial results may already
    /// have been emitted to the sink.
    #[error("computation was cancelled")]
    Cancelled,

    /// An error propagated from the [`crate::sink::PathSink`]. Aborts the
    /// current worker and sets global cancellation.
    #[error("sink error: {0}")]
    SinkError(String),
}

pub type Result<T> = std::result::Result<T, PathfinderError>;
