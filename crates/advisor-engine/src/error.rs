//! Error types for analysis operations

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by the engine to its caller
///
/// Individual provider failures never appear here — they are recovered
/// locally into degraded per-provider records. `InsufficientData` is the
/// only failure a caller sees for an analysis that ran.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No provider returned a usable record; no recommendation possible
    #[error("insufficient data: no provider returned a usable record")]
    InsufficientData,

    /// The requirement failed validation before any query was dispatched
    #[error(transparent)]
    InvalidRequirement(#[from] advisor_core::CoreError),

    /// Engine construction was given an unusable configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
