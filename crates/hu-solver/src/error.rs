//! Error types for solver setup.
//!
//! A solve itself never fails: non-convergence is reported through
//! [`SolveOutcome`](crate::SolveOutcome). These errors cover invalid
//! configuration and initial states.

use hu_core::CoreError;
use hu_props::PropsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: &'static str },

    #[error("Invalid state: {what}")]
    InvalidState { what: &'static str },

    #[error("Numeric error: {0}")]
    Core(#[from] CoreError),

    #[error("Property error: {0}")]
    Props(#[from] PropsError),
}

pub type SolverResult<T> = Result<T, SolverError>;
