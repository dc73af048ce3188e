//! Named initial conditions.

use crate::bubble::BubbleFormationPhase;
use crate::error::{SimError, SimResult};
use hu_core::constants::setpoints::SOLID_PRESSURE_SETPOINT_PSIA;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Water-solid at the solid setpoint, everything at 150 °F.
    #[default]
    ColdShutdown,
    /// Water-solid with the pressurizer a few degrees subcooled.
    SolidNearSaturation,
    /// Bubble drawn and complete, level on program, pumps stopped.
    TwoPhaseStandby,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::ColdShutdown,
        Scenario::SolidNearSaturation,
        Scenario::TwoPhaseStandby,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::ColdShutdown => "cold-shutdown",
            Scenario::SolidNearSaturation => "solid-near-saturation",
            Scenario::TwoPhaseStandby => "two-phase-standby",
        }
    }

    pub fn initial_conditions(self) -> InitialConditions {
        match self {
            Scenario::ColdShutdown => InitialConditions {
                pressure_psia: SOLID_PRESSURE_SETPOINT_PSIA,
                pzr_temp_f: 150.0,
                loop_temp_f: 150.0,
                two_phase: None,
                tank_level_pct: 50.0,
                boron_ppm: 2_000.0,
            },
            Scenario::SolidNearSaturation => InitialConditions {
                pressure_psia: SOLID_PRESSURE_SETPOINT_PSIA,
                pzr_temp_f: 428.0,
                loop_temp_f: 160.0,
                two_phase: None,
                tank_level_pct: 50.0,
                boron_ppm: 2_000.0,
            },
            Scenario::TwoPhaseStandby => InitialConditions {
                pressure_psia: 400.0,
                pzr_temp_f: hu_props::saturation_temperature(400.0),
                loop_temp_f: 160.0,
                two_phase: Some(TwoPhaseStart {
                    level_pct: 25.0,
                    phase: BubbleFormationPhase::Complete,
                    heater_setpoint_psia: 410.0,
                }),
                tank_level_pct: 50.0,
                boron_ppm: 2_000.0,
            },
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| SimError::Config {
                what: format!("unknown scenario '{s}'"),
            })
    }
}

/// Two-phase starting point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoPhaseStart {
    pub level_pct: f64,
    pub phase: BubbleFormationPhase,
    pub heater_setpoint_psia: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub pressure_psia: f64,
    /// Pressurizer liquid temperature (°F).
    pub pzr_temp_f: f64,
    pub loop_temp_f: f64,
    /// `None` starts water-solid.
    pub two_phase: Option<TwoPhaseStart>,
    pub tank_level_pct: f64,
    pub boron_ppm: f64,
}
