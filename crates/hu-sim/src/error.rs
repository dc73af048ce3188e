//! Error types for simulation operations.

use hu_controls::ControlError;
use hu_core::CoreError;
use hu_props::PropsError;
use hu_solver::SolverError;
use thiserror::Error;

/// Errors encountered while building or advancing a scenario.
///
/// Modeled plant conditions (relief lifting, pressure outside the control
/// band, solver non-convergence) are never errors; they show up as alarms
/// and diagnostics in the snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid configuration: {what}")]
    Config { what: String },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    /// The mass ledger no longer closes: a flow was applied to one side only.
    #[error(
        "Mass conservation violated at t={time_s} s: RCS inventory off by {error_lbm} lbm (tolerance {tolerance_lbm} lbm)"
    )]
    ConservationViolated {
        time_s: f64,
        error_lbm: f64,
        tolerance_lbm: f64,
    },

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Property error: {0}")]
    Props(#[from] PropsError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Config {
            what: e.to_string(),
        }
    }
}
