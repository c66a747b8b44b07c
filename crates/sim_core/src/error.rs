//! Error types for the simulation core.
//!
//! Per §7 of the design notes, only Configuration errors are true errors in
//! this crate: they fail fast at scenario construction. Planning failures
//! (empty A* path), numeric degeneracy, and timeouts are NOT errors — they
//! are handled in-band (`Agent` state, clamped velocities, a flagged metric
//! record) and never reach this type.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Configuration-time errors for the simulation core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// Grid width or height was zero or negative.
    #[error("invalid grid dimensions: {width}x{height}")]
    InvalidGridDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },

    /// Cell size was zero or negative.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(String),

    /// Agent count was zero or negative.
    #[error("invalid agent count: {0}")]
    InvalidAgentCount(i64),

    /// A scenario was constructed with an empty avoidance-method list.
    #[error("method list must not be empty")]
    EmptyMethodList,
}
