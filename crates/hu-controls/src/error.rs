//! Error types for control blocks.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control block.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
