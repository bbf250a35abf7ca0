//! Error types for advisor-core

use thiserror::Error;

/// Result type alias for advisor-core
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing core data model values
#[derive(Error, Debug)]
pub enum CoreError {
    /// A resource requirement failed validation
    #[error("invalid requirement: {0}")]
    InvalidRequirement(String),
}
