//! Error types for the benchmark harness.
//!
//! Mirrors the teacher's `rts_headless::scenario::ScenarioError` /
//! sink-failure split: scenario-file problems and sink I/O failures are
//! distinct, caller-visible kinds (§7: "Scenario-level errors abort the
//! benchmark with a distinguishable kind").

use thiserror::Error;

/// Result type alias using [`BenchError`].
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors surfaced by the benchmark harness.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A scenario or sweep configuration failed validation at construction
    /// time (propagated from [`sim_core::error::SimError`]).
    #[error("invalid configuration: {0}")]
    Configuration(#[from] sim_core::error::SimError),

    /// A scenario/sweep RON file could not be found.
    #[error("config file not found: {0}")]
    FileNotFound(String),

    /// A scenario/sweep RON file could not be read from disk.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// A scenario/sweep RON file did not parse.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The metric sink's destination could not be written to (§7: "Sink I/O
    /// failure — surfaced to the benchmark caller; partial records so far
    /// are preserved in memory").
    #[error("failed to flush results: {0}")]
    SinkWrite(std::io::Error),
}
