//! Operator commands and their rejections.

use crate::bubble::BubbleFormationPhase;
use hu_core::constants::flow::MAX_CHARGING_GPM;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relief path lift during a relief test (gpm).
pub const RELIEF_TEST_GPM: f64 = 50.0;
/// Relief test duration (s).
pub const RELIEF_TEST_DURATION_S: f64 = 10.0;

/// Operator-fixed charging and letdown (gpm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowOverride {
    pub charging_gpm: f64,
    pub letdown_gpm: f64,
}

impl FlowOverride {
    pub fn validate(&self) -> Result<(), CommandRejection> {
        for (what, value) in [
            ("charging", self.charging_gpm),
            ("letdown", self.letdown_gpm),
        ] {
            if !(value.is_finite() && (0.0..=MAX_CHARGING_GPM).contains(&value)) {
                return Err(CommandRejection::FlowOutOfRange {
                    what,
                    value,
                    max: MAX_CHARGING_GPM,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command")]
pub enum OperatorCommand {
    SetTimeAcceleration { multiplier: f64 },
    ManualFlowOverride(FlowOverride),
    ClearFlowOverride,
    ReliefTest,
    StartReactorCoolantPumps,
    /// Restore the scenario's initial state.
    Reset,
}

/// Why a command was refused. The plant is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandRejection {
    #[error("Time acceleration {requested} outside (0, {max}]")]
    TimeAccelerationOutOfRange { requested: f64, max: f64 },

    #[error("Flows are fixed by the bubble sequence during {phase}")]
    FlowsOwnedBySequence { phase: BubbleFormationPhase },

    #[error("Manual {what} flow {value} gpm outside [0, {max}]")]
    FlowOutOfRange {
        what: &'static str,
        value: f64,
        max: f64,
    },

    #[error("No manual flow override is active")]
    NoOverrideActive,

    #[error("Relief test requires a water-solid plant")]
    ReliefTestRequiresSolidPlant,

    #[error("Relief test already in progress")]
    ReliefTestInProgress,

    #[error("Pump start not permitted during {phase}")]
    PumpStartNotPermitted { phase: BubbleFormationPhase },

    #[error("Reactor coolant pumps already running")]
    PumpsAlreadyRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_bounds() {
        let ok = FlowOverride {
            charging_gpm: 80.0,
            letdown_gpm: 0.0,
        };
        assert!(ok.validate().is_ok());

        let bad = FlowOverride {
            charging_gpm: 80.0,
            letdown_gpm: 151.0,
        };
        assert!(matches!(
            bad.validate(),
            Err(CommandRejection::FlowOutOfRange { what: "letdown", .. })
        ));

        let nan = FlowOverride {
            charging_gpm: f64::NAN,
            letdown_gpm: 75.0,
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn commands_deserialize_from_yaml() {
        let cmds: Vec<OperatorCommand> = serde_yaml::from_str(
            "- command: set_time_acceleration\n  multiplier: 10.0\n- command: relief_test\n",
        )
        .unwrap();
        assert_eq!(
            cmds,
            vec![
                OperatorCommand::SetTimeAcceleration { multiplier: 10.0 },
                OperatorCommand::ReliefTest,
            ]
        );
    }
}
