//! First-order lag.
//!
//! Dynamics `dy/dt = (u - y) / tau`, discretized exactly for a command held
//! over the step: `y += (u - y) * (1 - exp(-dt / tau))`. The exact form is
//! stable for any `dt`, so heater response does not depend on the tick size.

use crate::error::{ControlError, ControlResult};
use hu_core::lag_fraction;
use serde::{Deserialize, Serialize};

/// Output of a first-order lag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LagState {
    pub value: f64,
}

/// First-order lag with time constant `tau`.
///
/// # Example
///
/// ```
/// use hu_controls::{FirstOrderLag, LagState};
///
/// let lag = FirstOrderLag::new(20.0).unwrap();
/// let mut state = LagState::default();
/// for _ in 0..20 {
///     state = lag.step(&state, 1.0, 1_800.0);
/// }
/// // One time constant: ~63% of the commanded value
/// assert!((state.value / 1_800.0 - 0.632).abs() < 0.001);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderLag {
    /// Time constant (seconds), must be positive
    pub tau: f64,
}

impl FirstOrderLag {
    pub fn new(tau: f64) -> ControlResult<Self> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "tau must be positive",
            });
        }
        Ok(Self { tau })
    }

    /// Advance by `dt` with `command` held over the step.
    pub fn step(&self, state: &LagState, dt: f64, command: f64) -> LagState {
        LagState {
            value: state.value + (command - state.value) * lag_fraction(dt, self.tau),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_response_at_one_and_three_time_constants() {
        let lag = FirstOrderLag::new(20.0).unwrap();
        let mut state = LagState::default();
        for _ in 0..20 {
            state = lag.step(&state, 1.0, 1.0);
        }
        assert!((state.value - 0.632).abs() < 0.001);
        for _ in 0..40 {
            state = lag.step(&state, 1.0, 1.0);
        }
        assert!((state.value - 0.950).abs() < 0.001);
    }

    #[test]
    fn response_is_independent_of_step_size() {
        let lag = FirstOrderLag::new(20.0).unwrap();
        let coarse = lag.step(&LagState::default(), 10.0, 1.0);
        let mut fine = LagState::default();
        for _ in 0..100 {
            fine = lag.step(&fine, 0.1, 1.0);
        }
        assert!((coarse.value - fine.value).abs() < 1e-12);
    }

    #[test]
    fn decays_toward_lower_command() {
        let lag = FirstOrderLag::new(5.0).unwrap();
        let state = lag.step(&LagState { value: 1.0 }, 1.0, 0.0);
        assert!(state.value < 1.0 && state.value > 0.0);
    }

    #[test]
    fn invalid_parameters() {
        assert!(FirstOrderLag::new(0.0).is_err());
        assert!(FirstOrderLag::new(-1.0).is_err());
        assert!(FirstOrderLag::new(f64::NAN).is_err());
    }
}
