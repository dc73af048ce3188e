//! Water-solid plant pressure control.
//!
//! With no steam cushion the pressurizer and loop form one volume of slightly
//! compressible liquid. Pressure follows the balance between thermal
//! expansion and net volume removal:
//!
//! ```text
//! ΔP = (ΔV_thermal − ΔV_removed) / (V_pzr·κ(T_pzr) + V_loop·κ(T_loop))
//! ```
//!
//! A PI loop trims letdown around its base flow to hold the solid setpoint;
//! the relief path lifts above the open setpoint and reseats below the
//! reseat setpoint. Tuned for the reference plant volumes: re-derive the
//! gains if those change.

use crate::command::FlowOverride;
use crate::config::HeatTransferConfig;
use crate::error::SimResult;
use crate::flows::{CvcsFlows, gpm_at_density_to_lbm_per_s};
use crate::pressurizer::advance_heater;
use hu_controls::{ControlAction, HysteresisSwitch, LagState, PIController, PIControllerState};
use hu_core::constants::flow::{
    MAX_LETDOWN_GPM, MAX_RELIEF_GPM, NORMAL_CHARGING_GPM, NORMAL_LETDOWN_GPM, RELIEF_GPM_PER_PSI,
};
use hu_core::constants::physics::ATMOSPHERIC_PSIA;
use hu_core::constants::plant::{
    LOOP_VOLUME_FT3, PZR_VOLUME_FT3, PZR_WALL_HEAT_CAPACITY_BTU_PER_F,
    RCS_METAL_HEAT_CAPACITY_BTU_PER_F,
};
use hu_core::constants::setpoints::{
    RELIEF_OPEN_PSIA, RELIEF_RESEAT_PSIA, SOLID_PRESSURE_SETPOINT_PSIA,
};
use hu_core::units::kw_to_btu_per_s;
use hu_props::saturation::MAX_PRESSURE_PSIA;
use hu_props::{
    expansion_coefficient, liquid_density, saturated_liquid_enthalpy, saturation_temperature,
    system_compliance, temperature_change_from_heat, validate_liquid_state,
};
use serde::{Deserialize, Serialize};

/// Proportional gain (gpm of letdown per psi).
const PRESSURE_KP: f64 = 0.5;
/// Integral time (s); Ki = 0.02 /s.
const PRESSURE_TI_S: f64 = 50.0;
const PRESSURE_INTEGRAL_LIMIT: f64 = 4_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidPlantState {
    pub pressure_psia: f64,
    pub pzr_temp_f: f64,
    pub loop_temp_f: f64,
    /// Total reactor coolant inventory (lbm).
    pub total_mass_lbm: f64,
    pub controller: PIControllerState,
    /// Effective heater power (kW).
    pub heater: LagState,
    pub charging_gpm: f64,
    pub letdown_gpm: f64,
    pub relief_gpm: f64,
    pub relief_open: bool,
    /// Pressurizer liquid has reached saturation.
    pub bubble_ready: bool,
}

impl SolidPlantState {
    /// Liquid-filled plant at rest, inventory from the local densities.
    pub fn new(pressure_psia: f64, pzr_temp_f: f64, loop_temp_f: f64) -> SimResult<Self> {
        validate_liquid_state(pzr_temp_f, pressure_psia)?;
        validate_liquid_state(loop_temp_f, pressure_psia)?;
        let total_mass_lbm = PZR_VOLUME_FT3 * liquid_density(pzr_temp_f, pressure_psia)
            + LOOP_VOLUME_FT3 * liquid_density(loop_temp_f, pressure_psia);
        Ok(Self {
            pressure_psia,
            pzr_temp_f,
            loop_temp_f,
            total_mass_lbm,
            controller: PIControllerState::default(),
            heater: LagState::default(),
            charging_gpm: NORMAL_CHARGING_GPM,
            letdown_gpm: NORMAL_LETDOWN_GPM,
            relief_gpm: 0.0,
            relief_open: false,
            bubble_ready: pzr_temp_f >= saturation_temperature(pressure_psia),
        })
    }

    pub fn pzr_mass_lbm(&self) -> f64 {
        PZR_VOLUME_FT3 * liquid_density(self.pzr_temp_f, self.pressure_psia)
    }

    /// Pressurizer subcooling margin (°F).
    pub fn subcooling_f(&self) -> f64 {
        saturation_temperature(self.pressure_psia) - self.pzr_temp_f
    }

    pub fn flows(&self) -> CvcsFlows {
        CvcsFlows {
            charging_gpm: self.charging_gpm,
            letdown_gpm: self.letdown_gpm,
            seal_injection_gpm: 0.0,
            seal_return_gpm: 0.0,
        }
    }
}

/// Forcing for one solid-plant step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidInputs {
    pub heater_command_kw: f64,
    /// Residual heat removal pump heat into the loop (kW).
    pub loop_heat_kw: f64,
    pub ambient_temp_f: f64,
    pub heat_transfer: HeatTransferConfig,
    /// Operator-fixed flows replacing the pressure controller.
    pub flow_override: Option<FlowOverride>,
    /// Extra relief path flow from a relief test (gpm).
    pub relief_test_gpm: f64,
}

/// What one step moved across the plant boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolidStepResult {
    pub flows: CvcsFlows,
    /// Mass out through the relief path (lbm).
    pub relief_lbm: f64,
    pub heat_in_btu: f64,
    pub heat_loss_btu: f64,
    /// Relief changed state this step.
    pub relief_lifted: bool,
    pub relief_reseated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolidPlantController {
    pub pressure_pi: PIController,
    pub relief: HysteresisSwitch,
    pub setpoint_psia: f64,
}

impl SolidPlantController {
    pub fn new() -> SimResult<Self> {
        let pressure_pi = PIController::new(
            PRESSURE_KP,
            PRESSURE_TI_S,
            -NORMAL_LETDOWN_GPM,
            MAX_LETDOWN_GPM - NORMAL_LETDOWN_GPM,
        )?
        .with_integral_limit(PRESSURE_INTEGRAL_LIMIT)
        .with_action(ControlAction::Reverse);
        Ok(Self {
            pressure_pi,
            relief: HysteresisSwitch::high(RELIEF_OPEN_PSIA, RELIEF_RESEAT_PSIA)?,
            setpoint_psia: SOLID_PRESSURE_SETPOINT_PSIA,
        })
    }

    /// Relief flow (gpm) for an open valve at `pressure_psia`.
    pub fn relief_flow_gpm(pressure_psia: f64) -> f64 {
        (RELIEF_GPM_PER_PSI * (pressure_psia - RELIEF_RESEAT_PSIA)).clamp(0.0, MAX_RELIEF_GPM)
    }

    /// Advance the water-solid plant by `dt_s`.
    pub fn step(
        &self,
        state: &SolidPlantState,
        inputs: &SolidInputs,
        dt_s: f64,
    ) -> (SolidPlantState, SolidStepResult) {
        let p = state.pressure_psia;
        let t_pzr = state.pzr_temp_f;
        let t_loop = state.loop_temp_f;
        let ht = &inputs.heat_transfer;

        let heater = advance_heater(&state.heater, inputs.heater_command_kw, dt_s);
        let q_heater = kw_to_btu_per_s(heater.value);
        let q_loop_source = kw_to_btu_per_s(inputs.loop_heat_kw.max(0.0));
        let q_surge = ht.surge_line_ua * (t_pzr - t_loop);
        let q_pzr_loss = ht.pzr_ambient_ua * (t_pzr - inputs.ambient_temp_f);
        let q_loop_loss = ht.loop_ambient_ua * (t_loop - inputs.ambient_temp_f);

        let pzr_mass = PZR_VOLUME_FT3 * liquid_density(t_pzr, p);
        let loop_mass = LOOP_VOLUME_FT3 * liquid_density(t_loop, p);
        let dt_pzr = temperature_change_from_heat(
            (q_heater - q_surge - q_pzr_loss) * dt_s,
            pzr_mass,
            t_pzr,
            PZR_WALL_HEAT_CAPACITY_BTU_PER_F,
        );
        // Water the pressurizer expands out through the surge line carries
        // pressurizer enthalpy into the loop
        let outsurge_lbm = pzr_mass * expansion_coefficient(t_pzr, p) * dt_pzr;
        let outsurge_btu = outsurge_lbm
            * (saturated_liquid_enthalpy(t_pzr) - saturated_liquid_enthalpy(t_loop));
        let dt_loop = temperature_change_from_heat(
            (q_loop_source + q_surge - q_loop_loss) * dt_s + outsurge_btu,
            loop_mass,
            t_loop,
            RCS_METAL_HEAT_CAPACITY_BTU_PER_F,
        );
        let dv_thermal = PZR_VOLUME_FT3 * expansion_coefficient(t_pzr, p) * dt_pzr
            + LOOP_VOLUME_FT3 * expansion_coefficient(t_loop, p) * dt_loop;

        let (controller, charging, letdown) = match inputs.flow_override {
            Some(manual) => {
                // Track the manual letdown so release is bumpless
                let trim = manual.letdown_gpm - NORMAL_LETDOWN_GPM;
                let tracked = self.pressure_pi.state_for_output(trim, p, self.setpoint_psia);
                (tracked, manual.charging_gpm, manual.letdown_gpm)
            }
            None => {
                let (next, trim) =
                    self.pressure_pi
                        .update(&state.controller, p, self.setpoint_psia, dt_s);
                (next, NORMAL_CHARGING_GPM, NORMAL_LETDOWN_GPM + trim)
            }
        };

        let relief_open = self.relief.update(state.relief_open, p);
        let mut relief_gpm = inputs.relief_test_gpm.max(0.0);
        if relief_open {
            relief_gpm += Self::relief_flow_gpm(p);
        }
        let relief_gpm = relief_gpm.min(MAX_RELIEF_GPM);

        let flows = CvcsFlows {
            charging_gpm: charging,
            letdown_gpm: letdown,
            seal_injection_gpm: 0.0,
            seal_return_gpm: 0.0,
        };
        let rho_loop = liquid_density(t_loop, p);
        let relief_lbm = gpm_at_density_to_lbm_per_s(relief_gpm, rho_loop) * dt_s;
        let net_cvcs_lbm = flows.net_to_rcs_lbm(dt_s);
        let dv_removed = (relief_lbm - net_cvcs_lbm) / rho_loop;
        let compliance = system_compliance(&[(PZR_VOLUME_FT3, t_pzr), (LOOP_VOLUME_FT3, t_loop)]);

        // Below atmospheric the liquid column would separate
        let pressure = (p + (dv_thermal - dv_removed) / compliance)
            .clamp(ATMOSPHERIC_PSIA, MAX_PRESSURE_PSIA);
        let pzr_temp_f = t_pzr + dt_pzr;

        let next = SolidPlantState {
            pressure_psia: pressure,
            pzr_temp_f,
            loop_temp_f: t_loop + dt_loop,
            total_mass_lbm: state.total_mass_lbm + net_cvcs_lbm - relief_lbm,
            controller,
            heater,
            charging_gpm: charging,
            letdown_gpm: letdown,
            relief_gpm,
            relief_open,
            bubble_ready: pzr_temp_f >= saturation_temperature(pressure),
        };
        let result = SolidStepResult {
            flows,
            relief_lbm,
            heat_in_btu: (q_heater + q_loop_source) * dt_s,
            heat_loss_btu: (q_pzr_loss + q_loop_loss) * dt_s,
            relief_lifted: relief_open && !state.relief_open,
            relief_reseated: !relief_open && state.relief_open,
        };
        (next, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(heater_kw: f64, loop_kw: f64) -> SolidInputs {
        SolidInputs {
            heater_command_kw: heater_kw,
            loop_heat_kw: loop_kw,
            ambient_temp_f: 80.0,
            heat_transfer: HeatTransferConfig::default(),
            flow_override: None,
            relief_test_gpm: 0.0,
        }
    }

    #[test]
    fn lossless_plant_at_setpoint_holds() {
        let ctrl = SolidPlantController::new().unwrap();
        let mut state = SolidPlantState::new(350.0, 150.0, 150.0).unwrap();
        let lossless = SolidInputs {
            heat_transfer: HeatTransferConfig {
                surge_line_ua: 0.0,
                pzr_ambient_ua: 0.0,
                loop_ambient_ua: 0.0,
            },
            ..inputs(0.0, 0.0)
        };
        let start = state;
        for _ in 0..100 {
            state = ctrl.step(&state, &lossless, 1.0).0;
        }
        assert_eq!(state.pressure_psia, start.pressure_psia);
        assert_eq!(state.pzr_temp_f, start.pzr_temp_f);
        assert_eq!(state.total_mass_lbm, start.total_mass_lbm);
    }

    #[test]
    fn heatup_is_held_near_setpoint_by_letdown() {
        let ctrl = SolidPlantController::new().unwrap();
        let mut state = SolidPlantState::new(350.0, 150.0, 150.0).unwrap();
        for _ in 0..3_600 {
            state = ctrl.step(&state, &inputs(1_800.0, 500.0), 1.0).0;
        }
        assert!(state.pzr_temp_f > 150.0 && state.loop_temp_f > 150.0);
        assert!(state.letdown_gpm > NORMAL_LETDOWN_GPM);
        assert!((state.pressure_psia - 350.0).abs() < 30.0);
        assert!(!state.relief_open);
    }

    #[test]
    fn pressurizer_expansion_warms_the_loop() {
        let ctrl = SolidPlantController::new().unwrap();
        let state = SolidPlantState::new(350.0, 300.0, 150.0).unwrap();
        let heater_only = SolidInputs {
            heat_transfer: HeatTransferConfig {
                surge_line_ua: 0.0,
                pzr_ambient_ua: 0.0,
                loop_ambient_ua: 0.0,
            },
            ..inputs(1_800.0, 0.0)
        };
        let mut next = state;
        for _ in 0..600 {
            next = ctrl.step(&next, &heater_only, 1.0).0;
        }
        // Only the outsurge crosses the surge line, and it leaves hot
        assert!(next.pzr_temp_f > state.pzr_temp_f);
        assert!(next.loop_temp_f > state.loop_temp_f);
        assert!(next.loop_temp_f - state.loop_temp_f < 0.5);
    }

    #[test]
    fn relief_lifts_and_counts_mass() {
        let ctrl = SolidPlantController::new().unwrap();
        let state = SolidPlantState::new(460.0, 200.0, 200.0).unwrap();
        let (next, result) = ctrl.step(&state, &inputs(0.0, 0.0), 1.0);
        assert!(next.relief_open);
        assert!(result.relief_lifted);
        assert!((next.relief_gpm - 350.0).abs() < 1e-9);
        assert!(result.relief_lbm > 0.0);
        assert!(next.pressure_psia < 460.0);
    }

    #[test]
    fn relief_flow_is_proportional_and_capped() {
        assert_eq!(SolidPlantController::relief_flow_gpm(420.0), 0.0);
        assert!((SolidPlantController::relief_flow_gpm(450.0) - 250.0).abs() < 1e-9);
        assert_eq!(SolidPlantController::relief_flow_gpm(600.0), MAX_RELIEF_GPM);
    }

    #[test]
    fn manual_override_fixes_flows() {
        let ctrl = SolidPlantController::new().unwrap();
        let state = SolidPlantState::new(350.0, 150.0, 150.0).unwrap();
        let manual = SolidInputs {
            flow_override: Some(FlowOverride {
                charging_gpm: 60.0,
                letdown_gpm: 90.0,
            }),
            ..inputs(0.0, 0.0)
        };
        let (next, result) = ctrl.step(&state, &manual, 1.0);
        assert_eq!(next.charging_gpm, 60.0);
        assert_eq!(next.letdown_gpm, 90.0);
        assert!(result.flows.net_to_rcs_lbm(1.0) < 0.0);
        // Released to automatic, the first output picks up where manual left off
        let trim = ctrl.pressure_pi.output(&next.controller, 350.0, 350.0);
        assert!((NORMAL_LETDOWN_GPM + trim - 90.0).abs() < 1e-9);
    }

    #[test]
    fn saturated_pressurizer_is_bubble_ready() {
        let t_sat = saturation_temperature(350.0);
        let state = SolidPlantState::new(350.0, t_sat + 0.1, 160.0).unwrap();
        assert!(state.bubble_ready);
        let cold = SolidPlantState::new(350.0, 150.0, 150.0).unwrap();
        assert!(!cold.bubble_ready);
        assert!(cold.subcooling_f() > 200.0);
    }
}
