//! Plant operating modes.

use crate::error::{SimError, SimResult};
use crate::flow_control::{FlowControllerState, LevelObservation, TwoPhaseFlowController};
use crate::pressurizer::PressurizerState;
use crate::solid_plant::SolidPlantState;
use hu_controls::{PIController, PIControllerState};
use hu_core::constants::plant::{LOOP_VOLUME_FT3, PZR_VOLUME_FT3};
use hu_props::{liquid_density, saturation_pressure, vapor_density_at_pressure};
use hu_solver::{PressurizerInventory, SystemState};
use serde::{Deserialize, Serialize};

/// Payload of the two-phase mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoPhasePlant {
    pub system: SystemState,
    pub pressurizer: PressurizerState,
    pub flow: FlowControllerState,
    pub heater_control: PIControllerState,
    pub heater_setpoint_psia: f64,
    /// Heater demand from the last tick, as a fraction of capacity.
    pub heater_demand: f64,
}

impl TwoPhasePlant {
    /// Seed the steam space in a saturated solid plant.
    ///
    /// The pressurizer keeps its liquid at the solid temperature up to the
    /// seed level and saturated steam above it. Liquid displaced by the steam
    /// goes to the loop, so total inventory is unchanged. The heaters hold
    /// the saturation pressure of the liquid the steam formed from.
    pub fn from_solid(
        solid: &SolidPlantState,
        seed_level_pct: f64,
        heater_pi: &PIController,
        flow_controller: &TwoPhaseFlowController,
    ) -> SimResult<Self> {
        if !(seed_level_pct > 0.0 && seed_level_pct < 100.0) {
            return Err(SimError::InvalidArg {
                what: "seed level must be strictly between 0 and 100",
            });
        }
        let p = solid.pressure_psia;
        let rho_l = liquid_density(solid.pzr_temp_f, p);
        let vapor_volume = PZR_VOLUME_FT3 * (1.0 - seed_level_pct / 100.0);
        let liquid_volume = PZR_VOLUME_FT3 - vapor_volume;
        let inventory = PressurizerInventory {
            liquid_mass_lbm: liquid_volume * rho_l,
            vapor_mass_lbm: vapor_volume * vapor_density_at_pressure(p),
            liquid_volume_ft3: liquid_volume,
            vapor_volume_ft3: vapor_volume,
        };
        let loop_mass = solid.total_mass_lbm - inventory.total_mass();
        if loop_mass <= 0.0 {
            return Err(SimError::NonPhysical {
                what: "loop inventory exhausted at bubble formation",
            });
        }
        let system = SystemState {
            pressure_psia: p,
            loop_temp_f: solid.loop_temp_f,
            loop_volume_ft3: LOOP_VOLUME_FT3,
            loop_mass_lbm: loop_mass,
            pzr_volume_ft3: PZR_VOLUME_FT3,
            pressurizer: inventory,
        };
        system.validate()?;

        let setpoint = saturation_pressure(solid.pzr_temp_f);
        let obs = LevelObservation {
            level_pct: system.level_pct(),
            loop_temp_f: solid.loop_temp_f,
            pressure_psia: p,
            pumps_running: 0,
        };
        let mut pressurizer = PressurizerState::saturated(p, solid.pzr_temp_f, solid.heater.value);
        pressurizer.wall_temp_f = solid.pzr_temp_f;
        Ok(Self {
            system,
            pressurizer,
            flow: flow_controller.idle_state(&obs, solid.charging_gpm, solid.letdown_gpm),
            // Heaters were on full while solid: pick up there without a bump
            heater_control: heater_pi.state_for_output(1.0, p, setpoint),
            heater_setpoint_psia: setpoint,
            heater_demand: 1.0,
        })
    }

    pub fn level_pct(&self) -> f64 {
        self.system.level_pct()
    }
}

/// Exactly one authoritative state set at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlantMode {
    Solid(SolidPlantState),
    TwoPhase(Box<TwoPhasePlant>),
}

impl PlantMode {
    pub fn is_solid(&self) -> bool {
        matches!(self, PlantMode::Solid(_))
    }

    pub fn pressure_psia(&self) -> f64 {
        match self {
            PlantMode::Solid(s) => s.pressure_psia,
            PlantMode::TwoPhase(t) => t.system.pressure_psia,
        }
    }

    pub fn loop_temp_f(&self) -> f64 {
        match self {
            PlantMode::Solid(s) => s.loop_temp_f,
            PlantMode::TwoPhase(t) => t.system.loop_temp_f,
        }
    }

    /// Reactor coolant inventory (lbm).
    pub fn rcs_mass_lbm(&self) -> f64 {
        match self {
            PlantMode::Solid(s) => s.total_mass_lbm,
            PlantMode::TwoPhase(t) => t.system.total_mass(),
        }
    }

    /// The one-time solid to two-phase transition.
    ///
    /// Replaces the solid payload with the seeded two-phase plant. Fails,
    /// leaving the mode untouched, if the bubble already exists.
    pub fn form_bubble(
        &mut self,
        seed_level_pct: f64,
        heater_pi: &PIController,
        flow_controller: &TwoPhaseFlowController,
    ) -> SimResult<()> {
        let PlantMode::Solid(solid) = self else {
            return Err(SimError::InvalidArg {
                what: "bubble already formed",
            });
        };
        let plant = TwoPhasePlant::from_solid(solid, seed_level_pct, heater_pi, flow_controller)?;
        *self = PlantMode::TwoPhase(Box::new(plant));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hu_props::saturation_temperature;

    fn heater_pi() -> PIController {
        PIController::new(1.0 / 30.0, 900.0, 0.0, 1.0).unwrap()
    }

    #[test]
    fn bubble_formation_preserves_inventory() {
        let t_sat = saturation_temperature(350.0);
        let solid = SolidPlantState::new(350.0, t_sat + 0.05, 180.0).unwrap();
        let mass = solid.total_mass_lbm;
        let mut mode = PlantMode::Solid(solid);
        let flow = TwoPhaseFlowController::new().unwrap();
        mode.form_bubble(95.0, &heater_pi(), &flow).unwrap();

        assert!(!mode.is_solid());
        assert!((mode.rcs_mass_lbm() - mass).abs() < 1e-6);
        let PlantMode::TwoPhase(plant) = &mode else {
            panic!("expected two-phase");
        };
        assert!((plant.level_pct() - 95.0).abs() < 1e-9);
        assert!(plant.pressurizer.bubble_formed);
        let setpoint = plant.heater_setpoint_psia;
        assert!((setpoint - hu_props::saturation_pressure(t_sat + 0.05)).abs() < 1e-9);
        assert!(setpoint > 350.0 && setpoint < 351.0);
        let demand = heater_pi().output(&plant.heater_control, 350.0, setpoint);
        assert!((demand - 1.0).abs() < 1e-9);
    }

    #[test]
    fn second_formation_is_rejected() {
        let t_sat = saturation_temperature(350.0);
        let solid = SolidPlantState::new(350.0, t_sat + 0.05, 180.0).unwrap();
        let mut mode = PlantMode::Solid(solid);
        let flow = TwoPhaseFlowController::new().unwrap();
        mode.form_bubble(95.0, &heater_pi(), &flow).unwrap();
        let before = mode.clone();
        assert!(mode.form_bubble(95.0, &heater_pi(), &flow).is_err());
        assert_eq!(mode, before);
    }
}
