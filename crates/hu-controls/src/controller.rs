//! PI controller block.
//!
//! Sampled PI with:
//! - Anti-windup (integral frozen while the output saturates)
//! - Output clamping
//! - Optional integral clamping
//! - Direct or reverse action
//! - Bumpless initialization and anticipatory bias on the integral

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Sign convention of the error term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlAction {
    /// `e = sp - pv`: output rises when the process variable is low.
    #[default]
    Direct,
    /// `e = pv - sp`: output rises when the process variable is high.
    Reverse,
}

/// PI controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIController {
    /// Proportional gain.
    pub kp: f64,
    /// Integral time constant (seconds). Larger values reduce integral action.
    pub ti: f64,
    /// Minimum output value.
    pub out_min: f64,
    /// Maximum output value.
    pub out_max: f64,
    /// Integral windup limit (optional).
    pub integral_limit: Option<f64>,
    /// Error sign convention.
    pub action: ControlAction,
}

impl PIController {
    /// Create a new direct-acting PI controller.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ti` - Integral time constant (seconds)
    /// * `out_min` - Minimum output
    /// * `out_max` - Maximum output
    pub fn new(kp: f64, ti: f64, out_min: f64, out_max: f64) -> ControlResult<Self> {
        if !kp.is_finite() || kp <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "kp must be positive",
            });
        }
        if !ti.is_finite() || ti <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "ti must be positive",
            });
        }
        if out_min >= out_max {
            return Err(ControlError::InvalidArg {
                what: "out_min must be less than out_max",
            });
        }
        Ok(Self {
            kp,
            ti,
            out_min,
            out_max,
            integral_limit: None,
            action: ControlAction::Direct,
        })
    }

    /// Set integral windup limit.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit.abs());
        self
    }

    /// Set the error sign convention.
    pub fn with_action(mut self, action: ControlAction) -> Self {
        self.action = action;
        self
    }

    /// Integral gain `kp / ti` (output units per error-second).
    pub fn ki(&self) -> f64 {
        self.kp / self.ti
    }

    /// Signed control error for this controller's action.
    pub fn error(&self, pv: f64, sp: f64) -> f64 {
        match self.action {
            ControlAction::Direct => sp - pv,
            ControlAction::Reverse => pv - sp,
        }
    }

    fn clamp_integral(&self, integral: f64) -> f64 {
        match self.integral_limit {
            Some(limit) => integral.clamp(-limit, limit),
            None => integral,
        }
    }

    /// Compute controller output given process variable and setpoint.
    ///
    /// Returns the updated state and the clamped output.
    pub fn update(
        &self,
        state: &PIControllerState,
        pv: f64,
        sp: f64,
        dt: f64,
    ) -> (PIControllerState, f64) {
        let error = self.error(pv, sp);
        let p_term = self.kp * error;

        let clamped_integral = self.clamp_integral(state.integral + error * dt);
        let output_raw = p_term + self.ki() * clamped_integral;
        let output = output_raw.clamp(self.out_min, self.out_max);

        // Saturated: keep the old integral
        let final_integral = if output == output_raw {
            clamped_integral
        } else {
            state.integral
        };

        (
            PIControllerState {
                integral: final_integral,
            },
            output,
        )
    }

    /// State whose next output at (`pv`, `sp`) equals `output`.
    ///
    /// Used to hand a loop over from another owner without a bump.
    pub fn state_for_output(&self, output: f64, pv: f64, sp: f64) -> PIControllerState {
        let target = output.clamp(self.out_min, self.out_max);
        let integral = (target - self.kp * self.error(pv, sp)) / self.ki();
        PIControllerState {
            integral: self.clamp_integral(integral),
        }
    }

    /// Shift the integral so the output moves by `delta_output` at unchanged error.
    ///
    /// Anticipatory pre-load ahead of a known disturbance.
    pub fn biased(&self, state: &PIControllerState, delta_output: f64) -> PIControllerState {
        PIControllerState {
            integral: self.clamp_integral(state.integral + delta_output / self.ki()),
        }
    }

    /// Output the controller would produce for `state` without advancing it.
    pub fn output(&self, state: &PIControllerState, pv: f64, sp: f64) -> f64 {
        (self.kp * self.error(pv, sp) + self.ki() * state.integral).clamp(self.out_min, self.out_max)
    }
}

/// PI controller state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PIControllerState {
    /// Integral accumulator (error-seconds).
    pub integral: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pi_controller_creation() {
        let pi = PIController::new(1.0, 2.0, 0.0, 1.0).unwrap();
        assert_eq!(pi.kp, 1.0);
        assert_eq!(pi.ti, 2.0);
        assert_eq!(pi.action, ControlAction::Direct);
        assert!((pi.ki() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pi_controller_proportional_only() {
        let pi = PIController::new(2.0, 1000.0, 0.0, 1.0).unwrap();
        let state = PIControllerState::default();

        let (_, output) = pi.update(&state, 0.5, 1.0, 0.1);
        // e = 0.5, P = 1.0, at the output limit
        assert!((output - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pi_controller_integral_action() {
        let pi = PIController::new(1.0, 1.0, 0.0, 10.0).unwrap();
        let mut state = PIControllerState::default();

        for _ in 0..10 {
            let (new_state, _) = pi.update(&state, 0.0, 1.0, 0.1);
            state = new_state;
        }
        assert!(state.integral > 0.5);
    }

    #[test]
    fn pi_controller_output_clamping() {
        let pi = PIController::new(10.0, 1.0, 0.0, 1.0).unwrap();
        let state = PIControllerState::default();

        let (_, output) = pi.update(&state, 0.0, 10.0, 0.1);
        assert_eq!(output, 1.0);
    }

    #[test]
    fn saturated_output_freezes_integral() {
        let pi = PIController::new(10.0, 1.0, 0.0, 1.0).unwrap();
        let state = PIControllerState { integral: 0.05 };
        let (next, _) = pi.update(&state, 0.0, 10.0, 1.0);
        assert_eq!(next.integral, 0.05);
    }

    #[test]
    fn reverse_action_opens_on_high_pressure() {
        // Letdown trim: pressure above setpoint should increase the output
        let pi = PIController::new(0.5, 50.0, -75.0, 45.0)
            .unwrap()
            .with_action(ControlAction::Reverse)
            .with_integral_limit(4_000.0);
        let state = PIControllerState::default();
        let (_, high) = pi.update(&state, 360.0, 350.0, 1.0);
        let (_, low) = pi.update(&state, 340.0, 350.0, 1.0);
        assert!(high > 0.0);
        assert!(low < 0.0);
        assert!((high - (0.5 * 10.0 + 0.01 * 10.0)).abs() < 1e-12);
    }

    #[test]
    fn integral_limit_caps_accumulation() {
        let pi = PIController::new(0.01, 1.0, -1e6, 1e6)
            .unwrap()
            .with_integral_limit(5.0);
        let mut state = PIControllerState::default();
        for _ in 0..100 {
            state = pi.update(&state, 0.0, 1.0, 1.0).0;
        }
        assert_eq!(state.integral, 5.0);
    }

    #[test]
    fn bumpless_state_reproduces_requested_output() {
        let pi = PIController::new(5.0, 2_500.0, 0.0, 150.0).unwrap();
        let state = pi.state_for_output(78.0, 24.0, 25.0);
        assert!((pi.output(&state, 24.0, 25.0) - 78.0).abs() < 1e-9);
    }

    #[test]
    fn bias_shifts_output_by_requested_amount() {
        let pi = PIController::new(5.0, 2_500.0, 0.0, 150.0).unwrap();
        let state = pi.state_for_output(80.0, 25.0, 25.0);
        let biased = pi.biased(&state, 12.0);
        assert!((pi.output(&biased, 25.0, 25.0) - 92.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_controller_params() {
        assert!(PIController::new(1.0, -1.0, 0.0, 1.0).is_err());
        assert!(PIController::new(1.0, 1.0, 1.0, 0.0).is_err());
        assert!(PIController::new(0.0, 1.0, 0.0, 1.0).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn output_always_within_limits(
            pv in -1_000.0f64..1_000.0,
            sp in -1_000.0f64..1_000.0,
            integral in -1e5f64..1e5,
            dt in 0.01f64..10.0,
        ) {
            let pi = PIController::new(0.5, 50.0, -75.0, 45.0).unwrap();
            let (_, out) = pi.update(&PIControllerState { integral }, pv, sp, dt);
            prop_assert!((-75.0..=45.0).contains(&out));
        }
    }
}
