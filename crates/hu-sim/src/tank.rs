//! Volume control tank: the buffer between letdown and charging.
//!
//! Letdown and seal return flow in; charging is drawn out. A high level
//! diverts letdown to the holdup tanks, a low level starts automatic makeup
//! and a very low level swaps charging suction to the refueling water
//! storage tank (RWST). The tank also carries the flow accumulator the
//! orchestrator checks reactor coolant inventory against.

use crate::error::SimResult;
use crate::flows::{CvcsFlows, flow_reference_density, gpm_to_lbm_per_s};
use hu_controls::HysteresisSwitch;
use hu_core::constants::flow::{MAKEUP_GPM, MAX_DIVERT_GPM};
use hu_core::constants::plant::VCT_VOLUME_FT3;
use hu_core::constants::setpoints::{
    RWST_BORON_PPM, VCT_DIVERT_OFF_PCT, VCT_DIVERT_ON_PCT, VCT_DIVERT_SPAN_PCT,
    VCT_EMERGENCY_SUCTION_OFF_PCT, VCT_EMERGENCY_SUCTION_ON_PCT, VCT_MAKEUP_OFF_PCT,
    VCT_MAKEUP_ON_PCT,
};
use serde::{Deserialize, Serialize};

const PPM: f64 = 1.0e-6;

/// Cumulative flows across the tank boundary (lbm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowAccumulator {
    /// Charging minus letdown minus seal return, as delivered to the RCS.
    pub net_to_rcs_lbm: f64,
    pub makeup_lbm: f64,
    pub divert_lbm: f64,
    /// Charging drawn from the RWST instead of the tank.
    pub rwst_lbm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankState {
    pub mass_lbm: f64,
    pub boron_mass_lbm: f64,
    /// Reactor coolant boron, mixed as a single node (ppm).
    pub rcs_boron_ppm: f64,
    pub divert_active: bool,
    pub makeup_active: bool,
    pub emergency_suction: bool,
    pub accumulator: FlowAccumulator,
}

impl TankState {
    /// Tank at `level_pct` with water at `boron_ppm`, matching the RCS.
    pub fn new(level_pct: f64, boron_ppm: f64) -> Self {
        let mass_lbm = VCT_VOLUME_FT3 * flow_reference_density() * level_pct / 100.0;
        Self {
            mass_lbm,
            boron_mass_lbm: mass_lbm * boron_ppm * PPM,
            rcs_boron_ppm: boron_ppm,
            divert_active: false,
            makeup_active: false,
            emergency_suction: false,
            accumulator: FlowAccumulator::default(),
        }
    }

    pub fn level_pct(&self) -> f64 {
        100.0 * self.mass_lbm / (flow_reference_density() * VCT_VOLUME_FT3)
    }

    pub fn boron_ppm(&self) -> f64 {
        if self.mass_lbm > 0.0 {
            self.boron_mass_lbm / self.mass_lbm / PPM
        } else {
            0.0
        }
    }
}

/// Flows the tank itself added this step (gpm).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TankStepResult {
    pub divert_gpm: f64,
    pub makeup_gpm: f64,
    /// Concentration of the charging delivered to the RCS (ppm).
    pub charging_boron_ppm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryTank {
    pub divert: HysteresisSwitch,
    pub makeup: HysteresisSwitch,
    pub emergency_suction: HysteresisSwitch,
}

impl InventoryTank {
    pub fn new() -> SimResult<Self> {
        Ok(Self {
            divert: HysteresisSwitch::high(VCT_DIVERT_ON_PCT, VCT_DIVERT_OFF_PCT)?,
            makeup: HysteresisSwitch::low(VCT_MAKEUP_ON_PCT, VCT_MAKEUP_OFF_PCT)?,
            emergency_suction: HysteresisSwitch::low(
                VCT_EMERGENCY_SUCTION_ON_PCT,
                VCT_EMERGENCY_SUCTION_OFF_PCT,
            )?,
        })
    }

    /// Advance the tank by one step of `flows`.
    ///
    /// `rcs_mass_lbm` is the reactor coolant inventory after the flows were
    /// applied; it dilutes the returned boron.
    pub fn step(
        &self,
        state: &TankState,
        flows: &CvcsFlows,
        rcs_mass_lbm: f64,
        dt_s: f64,
    ) -> (TankState, TankStepResult) {
        let level = state.level_pct();
        let divert_active = self.divert.update(state.divert_active, level);
        let makeup_active = self.makeup.update(state.makeup_active, level);
        let emergency_suction = self.emergency_suction.update(state.emergency_suction, level);

        let inflow_gpm = flows.letdown_gpm + flows.seal_return_gpm;
        let divert_gpm = if divert_active {
            let demand = ((level - VCT_DIVERT_OFF_PCT) / VCT_DIVERT_SPAN_PCT).clamp(0.0, 1.0);
            inflow_gpm.min(MAX_DIVERT_GPM * demand)
        } else {
            0.0
        };
        let makeup_gpm = if makeup_active { MAKEUP_GPM } else { 0.0 };
        let drawn_gpm = if emergency_suction {
            0.0
        } else {
            flows.charging_gpm
        };

        let tank_ppm = state.boron_ppm();
        let rcs_ppm = state.rcs_boron_ppm;
        let inflow_lbm = gpm_to_lbm_per_s(inflow_gpm) * dt_s;
        let divert_lbm = gpm_to_lbm_per_s(divert_gpm) * dt_s;
        let makeup_lbm = gpm_to_lbm_per_s(makeup_gpm) * dt_s;
        let drawn_lbm = gpm_to_lbm_per_s(drawn_gpm) * dt_s;
        let charging_lbm = gpm_to_lbm_per_s(flows.charging_gpm) * dt_s;

        // Diverted water leaves before it mixes, at RCS concentration
        let mass_lbm = (state.mass_lbm + inflow_lbm + makeup_lbm - divert_lbm - drawn_lbm).max(0.0);
        let boron_mass_lbm = (state.boron_mass_lbm
            + (inflow_lbm - divert_lbm) * rcs_ppm * PPM
            + makeup_lbm * tank_ppm * PPM
            - drawn_lbm * tank_ppm * PPM)
            .max(0.0);

        let charging_ppm = if emergency_suction {
            RWST_BORON_PPM
        } else {
            tank_ppm
        };
        let rcs_boron = (rcs_ppm * PPM * (rcs_mass_lbm - flows.net_to_rcs_lbm(dt_s))
            + charging_lbm * charging_ppm * PPM
            - inflow_lbm * rcs_ppm * PPM)
            .max(0.0);
        let rcs_boron_ppm = if rcs_mass_lbm > 0.0 {
            rcs_boron / rcs_mass_lbm / PPM
        } else {
            rcs_ppm
        };

        let acc = &state.accumulator;
        let accumulator = FlowAccumulator {
            net_to_rcs_lbm: acc.net_to_rcs_lbm + flows.net_to_rcs_lbm(dt_s),
            makeup_lbm: acc.makeup_lbm + makeup_lbm,
            divert_lbm: acc.divert_lbm + divert_lbm,
            rwst_lbm: acc.rwst_lbm + if emergency_suction { charging_lbm } else { 0.0 },
        };

        let next = TankState {
            mass_lbm,
            boron_mass_lbm,
            rcs_boron_ppm,
            divert_active,
            makeup_active,
            emergency_suction,
            accumulator,
        };
        let result = TankStepResult {
            divert_gpm,
            makeup_gpm,
            charging_boron_ppm: charging_ppm,
        };
        (next, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flows(charging: f64, letdown: f64, ret: f64) -> CvcsFlows {
        CvcsFlows {
            charging_gpm: charging,
            letdown_gpm: letdown,
            seal_injection_gpm: 0.0,
            seal_return_gpm: ret,
        }
    }

    #[test]
    fn balanced_flows_hold_level() {
        let tank = InventoryTank::new().unwrap();
        let mut state = TankState::new(50.0, 1_000.0);
        for _ in 0..600 {
            state = tank.step(&state, &flows(87.0, 75.0, 12.0), 750_000.0, 1.0).0;
        }
        assert!((state.level_pct() - 50.0).abs() < 1e-9);
        assert!(state.accumulator.net_to_rcs_lbm.abs() < 1e-6);
        assert!((state.boron_ppm() - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn high_level_diverts_with_hysteresis() {
        let tank = InventoryTank::new().unwrap();
        let mut state = TankState::new(71.0, 1_000.0);
        let (next, result) = tank.step(&state, &flows(75.0, 75.0, 0.0), 750_000.0, 1.0);
        assert!(next.divert_active);
        assert!((result.divert_gpm - 120.0 * 6.0 / 25.0).abs() < 1e-9);

        // Holds between 65 and 70
        state = TankState {
            divert_active: true,
            ..TankState::new(67.0, 1_000.0)
        };
        let (next, _) = tank.step(&state, &flows(75.0, 75.0, 0.0), 750_000.0, 1.0);
        assert!(next.divert_active);

        state = TankState {
            divert_active: true,
            ..TankState::new(64.9, 1_000.0)
        };
        let (next, result) = tank.step(&state, &flows(75.0, 75.0, 0.0), 750_000.0, 1.0);
        assert!(!next.divert_active);
        assert_eq!(result.divert_gpm, 0.0);
    }

    #[test]
    fn low_level_makes_up_at_tank_concentration() {
        let tank = InventoryTank::new().unwrap();
        let state = TankState::new(19.0, 1_200.0);
        let (next, result) = tank.step(&state, &flows(75.0, 75.0, 0.0), 750_000.0, 1.0);
        assert!(next.makeup_active);
        assert_eq!(result.makeup_gpm, MAKEUP_GPM);
        assert!(next.level_pct() > 19.0);
        assert!((next.boron_ppm() - 1_200.0).abs() < 1e-6);
    }

    #[test]
    fn emergency_suction_borates_from_rwst() {
        let tank = InventoryTank::new().unwrap();
        let state = TankState::new(4.0, 1_000.0);
        let (next, result) = tank.step(&state, &flows(75.0, 75.0, 0.0), 750_000.0, 1.0);
        assert!(next.emergency_suction);
        assert_eq!(result.charging_boron_ppm, RWST_BORON_PPM);
        assert!(next.rcs_boron_ppm > 1_000.0);
        assert!(next.accumulator.rwst_lbm > 0.0);
        // Charging no longer draws the tank down
        assert!(next.level_pct() > 4.0);
    }
}
