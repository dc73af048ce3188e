//! Chemical and volume control flows.
//!
//! Flows are metered in gpm at a fixed reference density; mass flow is
//! derived from that one conversion everywhere so both sides of the ledger
//! see the same number.

use hu_core::constants::flow::{FLOW_REFERENCE_PRESSURE_PSIA, FLOW_REFERENCE_TEMP_F};
use hu_core::units::GPM_TO_FT3_PER_S;
use hu_props::liquid_density;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Density at which the flow meters are calibrated (lbm/ft³).
pub fn flow_reference_density() -> f64 {
    static DENSITY: OnceLock<f64> = OnceLock::new();
    *DENSITY.get_or_init(|| liquid_density(FLOW_REFERENCE_TEMP_F, FLOW_REFERENCE_PRESSURE_PSIA))
}

/// Metered volumetric flow (gpm) to mass flow (lbm/s).
pub fn gpm_to_lbm_per_s(gpm: f64) -> f64 {
    gpm * GPM_TO_FT3_PER_S * flow_reference_density()
}

/// Volumetric flow (gpm) of water at `density` to mass flow (lbm/s).
pub fn gpm_at_density_to_lbm_per_s(gpm: f64, density: f64) -> f64 {
    gpm * GPM_TO_FT3_PER_S * density
}

/// One tick's charging/letdown line-up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CvcsFlows {
    /// Total charging pump discharge, including seal injection.
    pub charging_gpm: f64,
    pub letdown_gpm: f64,
    pub seal_injection_gpm: f64,
    /// Seal leakoff returned to the tank.
    pub seal_return_gpm: f64,
}

impl CvcsFlows {
    pub fn net_to_rcs_gpm(&self) -> f64 {
        self.charging_gpm - self.letdown_gpm - self.seal_return_gpm
    }

    /// Net mass delivered to the reactor coolant system over `dt_s` (lbm).
    pub fn net_to_rcs_lbm(&self, dt_s: f64) -> f64 {
        gpm_to_lbm_per_s(self.net_to_rcs_gpm()) * dt_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_density_is_cool_water() {
        assert!((flow_reference_density() - 61.99).abs() < 0.02);
    }

    #[test]
    fn seventy_five_gpm_in_lbm_per_s() {
        // 75 gpm ≈ 10.36 lbm/s
        assert!((gpm_to_lbm_per_s(75.0) - 10.36).abs() < 0.02);
    }

    #[test]
    fn seal_return_counts_against_rcs() {
        let flows = CvcsFlows {
            charging_gpm: 75.0,
            letdown_gpm: 60.0,
            seal_injection_gpm: 32.0,
            seal_return_gpm: 12.0,
        };
        assert!((flows.net_to_rcs_gpm() - 3.0).abs() < 1e-12);
    }
}
