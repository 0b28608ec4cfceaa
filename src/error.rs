//! Error types for track generation

use thiserror::Error;

/// Errors that can occur during track generation or mesh building
///
/// Degenerate geometry (a bisector that does not cut a cell, a cell that fails
/// verification) is not represented here: it is recovered locally by leaving the
/// polygon unchanged or excluding the cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// Configuration validation failed before any geometry work
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The region selector ran out of cells (growth target or bridge building)
    ///
    /// Retrying with another seed usually succeeds.
    #[error("selection exhausted: {0}")]
    SelectionExhausted(String),
    /// Boundary stitching could not produce a single closed loop
    #[error("topology error: {0}")]
    Topology(String),
}

/// Result type alias for track operations
pub type Result<T> = std::result::Result<T, TrackError>;
