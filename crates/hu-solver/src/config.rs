//! Solver configuration.

use crate::error::{SolverError, SolverResult};
use hu_core::constants::physics::ATMOSPHERIC_PSIA;
use serde::{Deserialize, Serialize};

/// Pressure bounds the solver may not leave.
///
/// The band is the caller's responsibility. An at-power band applied to a
/// cold plant pins the answer at the floor; the solver reports that as
/// `clamped` instead of converged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureBand {
    pub floor_psia: f64,
    pub ceiling_psia: f64,
}

impl PressureBand {
    /// Wide band from atmospheric to design pressure for heatup and cooldown.
    pub const HEATUP: Self = Self {
        floor_psia: ATMOSPHERIC_PSIA,
        ceiling_psia: 2_500.0,
    };

    /// Tight band around normal operating pressure.
    pub const AT_POWER: Self = Self {
        floor_psia: 2_000.0,
        ceiling_psia: 2_500.0,
    };

    pub fn validate(&self) -> SolverResult<()> {
        if !(self.floor_psia.is_finite() && self.ceiling_psia.is_finite()) {
            return Err(SolverError::ProblemSetup {
                what: "pressure band must be finite",
            });
        }
        if self.floor_psia <= 0.0 || self.floor_psia >= self.ceiling_psia {
            return Err(SolverError::ProblemSetup {
                what: "pressure band floor must be positive and below the ceiling",
            });
        }
        Ok(())
    }

    /// Clamp `p` into the band, reporting whether a bound was hit.
    pub fn clamp(&self, p: f64) -> (f64, bool) {
        let clamped = p.clamp(self.floor_psia, self.ceiling_psia);
        (clamped, clamped != p)
    }

    pub fn contains(&self, p: f64) -> bool {
        (self.floor_psia..=self.ceiling_psia).contains(&p)
    }
}

impl Default for PressureBand {
    fn default() -> Self {
        Self::HEATUP
    }
}

/// Successive-substitution settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration cap; the only timeout the solver has.
    pub max_iterations: usize,
    /// Under-relaxation applied to each pressure update.
    pub relaxation: f64,
    /// Convergence threshold on the pressure update (psi).
    pub pressure_tolerance_psi: f64,
    /// Convergence threshold on the steam volume update (ft³).
    pub volume_tolerance_ft3: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            relaxation: 0.5,
            pressure_tolerance_psi: 1e-3,
            volume_tolerance_ft3: 1e-4,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if self.max_iterations == 0 {
            return Err(SolverError::ProblemSetup {
                what: "max_iterations must be positive",
            });
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(SolverError::ProblemSetup {
                what: "relaxation must be in (0, 1]",
            });
        }
        if !(self.pressure_tolerance_psi > 0.0 && self.volume_tolerance_ft3 > 0.0) {
            return Err(SolverError::ProblemSetup {
                what: "tolerances must be positive",
            });
        }
        Ok(())
    }
}
