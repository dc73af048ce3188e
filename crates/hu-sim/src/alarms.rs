//! Annunciator logic. Alarms describe modeled plant conditions; they never
//! stop the simulation.

use crate::flow_control::LetdownPath;
use hu_core::constants::setpoints::{
    HEATUP_RATE_HIGH_ALARM_F_PER_HR, LETDOWN_ISOLATION_LEVEL_PCT, PUMP_START_MIN_PSIA,
    PZR_LEVEL_HIGH_ALARM_PCT, RELIEF_OPEN_PSIA, SOLID_BAND_HIGH_PSIA, SOLID_BAND_LOW_PSIA,
    SUBCOOLING_LOW_ALARM_F, TWO_PHASE_PRESSURE_HIGH_ALARM_PSIA, VCT_LEVEL_HIGH_ALARM_PCT,
    VCT_LEVEL_LOW_ALARM_PCT,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Alarms {
    pub pressure_high: bool,
    pub pressure_low: bool,
    pub solid_band_deviation: bool,
    pub relief_open: bool,
    pub pzr_level_high: bool,
    /// Insurge held back at the minimum steam space.
    pub pzr_full: bool,
    pub pzr_level_low: bool,
    pub letdown_isolated: bool,
    pub tank_level_high: bool,
    pub tank_level_low: bool,
    pub subcooling_low: bool,
    pub heatup_rate_high: bool,
    pub solver_nonconvergence: bool,
    pub conservation_fault: bool,
}

/// Plant values the annunciator looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmInputs {
    pub solid: bool,
    pub pressure_psia: f64,
    pub pumps_running: u8,
    pub relief_open: bool,
    pub pzr_level_pct: f64,
    pub pzr_full: bool,
    pub letdown_path: LetdownPath,
    pub tank_level_pct: f64,
    /// Loop subcooling margin (°F).
    pub subcooling_f: f64,
    pub heatup_rate_f_per_hr: f64,
    pub solver_converged: bool,
    pub conservation_fault: bool,
}

impl Alarms {
    pub fn evaluate(inputs: &AlarmInputs) -> Self {
        let p = inputs.pressure_psia;
        let high_limit = if inputs.solid {
            RELIEF_OPEN_PSIA
        } else {
            TWO_PHASE_PRESSURE_HIGH_ALARM_PSIA
        };
        Self {
            pressure_high: p >= high_limit,
            // Reactor coolant pump seals need the pump-start pressure
            pressure_low: inputs.pumps_running > 0 && p < PUMP_START_MIN_PSIA,
            solid_band_deviation: inputs.solid
                && !(SOLID_BAND_LOW_PSIA..=SOLID_BAND_HIGH_PSIA).contains(&p),
            relief_open: inputs.relief_open,
            pzr_level_high: !inputs.solid && inputs.pzr_level_pct >= PZR_LEVEL_HIGH_ALARM_PCT,
            pzr_full: !inputs.solid && inputs.pzr_full,
            pzr_level_low: !inputs.solid && inputs.pzr_level_pct < LETDOWN_ISOLATION_LEVEL_PCT,
            letdown_isolated: inputs.letdown_path == LetdownPath::Isolated,
            tank_level_high: inputs.tank_level_pct >= VCT_LEVEL_HIGH_ALARM_PCT,
            tank_level_low: inputs.tank_level_pct <= VCT_LEVEL_LOW_ALARM_PCT,
            subcooling_low: inputs.subcooling_f < SUBCOOLING_LOW_ALARM_F,
            heatup_rate_high: inputs.heatup_rate_f_per_hr > HEATUP_RATE_HIGH_ALARM_F_PER_HR,
            solver_nonconvergence: !inputs.solver_converged,
            conservation_fault: inputs.conservation_fault,
        }
    }

    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_solid() -> AlarmInputs {
        AlarmInputs {
            solid: true,
            pressure_psia: 350.0,
            pumps_running: 0,
            relief_open: false,
            pzr_level_pct: 100.0,
            pzr_full: false,
            letdown_path: LetdownPath::CrossConnect,
            tank_level_pct: 50.0,
            subcooling_f: 250.0,
            heatup_rate_f_per_hr: 20.0,
            solver_converged: true,
            conservation_fault: false,
        }
    }

    #[test]
    fn quiet_plant_has_no_alarms() {
        assert!(!Alarms::evaluate(&normal_solid()).any());
    }

    #[test]
    fn full_solid_pressurizer_is_not_a_level_alarm() {
        let alarms = Alarms::evaluate(&normal_solid());
        assert!(!alarms.pzr_level_high);
    }

    #[test]
    fn filled_steam_space_alarms_with_high_level() {
        let filled = AlarmInputs {
            solid: false,
            pressure_psia: 2_400.0,
            pzr_level_pct: 99.99,
            pzr_full: true,
            solver_converged: false,
            ..normal_solid()
        };
        let alarms = Alarms::evaluate(&filled);
        assert!(alarms.pzr_full && alarms.pzr_level_high);
        assert!(alarms.pressure_high && alarms.solver_nonconvergence);
    }

    #[test]
    fn pressure_alarms_depend_on_mode() {
        let solid_high = AlarmInputs {
            pressure_psia: 455.0,
            relief_open: true,
            ..normal_solid()
        };
        let alarms = Alarms::evaluate(&solid_high);
        assert!(alarms.pressure_high && alarms.relief_open && alarms.solid_band_deviation);

        let two_phase = AlarmInputs {
            solid: false,
            pressure_psia: 455.0,
            pzr_level_pct: 25.0,
            ..normal_solid()
        };
        assert!(!Alarms::evaluate(&two_phase).pressure_high);

        let pumps_low = AlarmInputs {
            pumps_running: 4,
            pressure_psia: 380.0,
            ..two_phase
        };
        assert!(Alarms::evaluate(&pumps_low).pressure_low);
    }

    #[test]
    fn tank_and_rate_alarms() {
        let inputs = AlarmInputs {
            tank_level_pct: 85.0,
            heatup_rate_f_per_hr: 120.0,
            subcooling_f: 10.0,
            ..normal_solid()
        };
        let alarms = Alarms::evaluate(&inputs);
        assert!(alarms.tank_level_high);
        assert!(!alarms.tank_level_low);
        assert!(alarms.heatup_rate_high);
        assert!(alarms.subcooling_low);
    }
}
