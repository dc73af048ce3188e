//! Two-phase charging and letdown control.
//!
//! Once steam exists the pressurizer level, not pressure, is controlled.
//! Charging comes from a PI loop on level against a program that rises with
//! loop temperature. Letdown runs at its normal flow for the current routing,
//! opens toward the path's capacity while level sits above the program, and
//! drops to zero when the low-level interlock isolates it.

use crate::command::FlowOverride;
use crate::error::SimResult;
use crate::flows::CvcsFlows;
use hu_controls::{PIController, PIControllerState};
use hu_core::constants::flow::{
    MAX_CHARGING_GPM, MAX_LETDOWN_GPM, NORMAL_LETDOWN_GPM, ORIFICE_RATED_PRESSURE_PSIA,
    SEAL_INJECTION_GPM_PER_PUMP, SEAL_RETURN_GPM_PER_PUMP,
};
use hu_core::constants::setpoints::{
    LETDOWN_ISOLATION_LEVEL_PCT, LEVEL_PROGRAM_HIGH_PCT, LEVEL_PROGRAM_HIGH_TEMP_F,
    LEVEL_PROGRAM_LOW_PCT, LEVEL_PROGRAM_LOW_TEMP_F, RHR_CROSS_CONNECT_MAX_PRESSURE_PSIA,
    RHR_CROSS_CONNECT_MAX_TEMP_F,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level controller gain (gpm per % level).
const LEVEL_KP: f64 = 10.0;
const LEVEL_TI_S: f64 = 1_200.0;
/// Extra letdown per % of level above the program deadband (gpm).
const EXCESS_LETDOWN_GPM_PER_PCT: f64 = 10.0;
const EXCESS_LETDOWN_DEADBAND_PCT: f64 = 2.0;
/// Extra charging demand expected per pump at start (gpm).
const PUMP_START_BIAS_GPM_PER_PUMP: f64 = 3.0;

/// Where letdown leaves the reactor coolant system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LetdownPath {
    /// Through the residual heat removal cross-connect (cold, low pressure).
    CrossConnect,
    /// Through the letdown orifices.
    Orifice,
    Isolated,
}

impl fmt::Display for LetdownPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LetdownPath::CrossConnect => "cross-connect",
            LetdownPath::Orifice => "orifice",
            LetdownPath::Isolated => "isolated",
        };
        write!(f, "{name}")
    }
}

/// Pressurizer level setpoint (%) for loop temperature `t_loop_f`.
pub fn level_program(t_loop_f: f64) -> f64 {
    let span = LEVEL_PROGRAM_HIGH_TEMP_F - LEVEL_PROGRAM_LOW_TEMP_F;
    let frac = ((t_loop_f - LEVEL_PROGRAM_LOW_TEMP_F) / span).clamp(0.0, 1.0);
    LEVEL_PROGRAM_LOW_PCT + frac * (LEVEL_PROGRAM_HIGH_PCT - LEVEL_PROGRAM_LOW_PCT)
}

/// Letdown routing from the present plant condition only.
pub fn select_letdown_path(t_loop_f: f64, pressure_psia: f64, level_pct: f64) -> LetdownPath {
    if level_pct < LETDOWN_ISOLATION_LEVEL_PCT {
        LetdownPath::Isolated
    } else if t_loop_f < RHR_CROSS_CONNECT_MAX_TEMP_F
        && pressure_psia < RHR_CROSS_CONNECT_MAX_PRESSURE_PSIA
    {
        LetdownPath::CrossConnect
    } else {
        LetdownPath::Orifice
    }
}

/// Letdown flow (gpm) the path passes at `pressure_psia`.
pub fn normal_letdown_gpm(path: LetdownPath, pressure_psia: f64) -> f64 {
    match path {
        LetdownPath::CrossConnect => NORMAL_LETDOWN_GPM,
        LetdownPath::Orifice => (NORMAL_LETDOWN_GPM * orifice_ratio(pressure_psia)).min(NORMAL_LETDOWN_GPM),
        LetdownPath::Isolated => 0.0,
    }
}

fn orifice_ratio(pressure_psia: f64) -> f64 {
    (pressure_psia.max(0.0) / ORIFICE_RATED_PRESSURE_PSIA).sqrt()
}

/// Letdown (gpm) the path can pass at `pressure_psia` with every orifice open.
pub fn letdown_capacity_gpm(path: LetdownPath, pressure_psia: f64) -> f64 {
    match path {
        LetdownPath::CrossConnect => MAX_LETDOWN_GPM,
        LetdownPath::Orifice => (MAX_LETDOWN_GPM * orifice_ratio(pressure_psia)).min(MAX_LETDOWN_GPM),
        LetdownPath::Isolated => 0.0,
    }
}

/// Automatic letdown (gpm): normal flow, opened further while level is
/// more than the deadband above `setpoint_pct`.
pub fn automatic_letdown_gpm(
    path: LetdownPath,
    pressure_psia: f64,
    level_pct: f64,
    setpoint_pct: f64,
) -> f64 {
    let normal = normal_letdown_gpm(path, pressure_psia);
    let excess = (level_pct - setpoint_pct - EXCESS_LETDOWN_DEADBAND_PCT).max(0.0)
        * EXCESS_LETDOWN_GPM_PER_PCT;
    (normal + excess)
        .min(letdown_capacity_gpm(path, pressure_psia))
        .max(normal)
}

/// Seal injection and seal return (gpm) for `pumps` running.
pub fn seal_flows(pumps: u8) -> (f64, f64) {
    let n = f64::from(pumps);
    (n * SEAL_INJECTION_GPM_PER_PUMP, n * SEAL_RETURN_GPM_PER_PUMP)
}

/// Controller state carried between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowControllerState {
    pub level_pi: PIControllerState,
    pub charging_gpm: f64,
    pub letdown_gpm: f64,
    pub level_setpoint_pct: f64,
    pub path: LetdownPath,
}

/// Plant condition seen by the flow controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelObservation {
    pub level_pct: f64,
    pub loop_temp_f: f64,
    pub pressure_psia: f64,
    pub pumps_running: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwoPhaseFlowController {
    pub level_pi: PIController,
}

impl TwoPhaseFlowController {
    pub fn new() -> SimResult<Self> {
        Ok(Self {
            level_pi: PIController::new(LEVEL_KP, LEVEL_TI_S, 0.0, MAX_CHARGING_GPM)?,
        })
    }

    /// Charging never drops below what the seals take.
    fn bounded(&self, pumps: u8) -> PIController {
        let (injection, _) = seal_flows(pumps);
        PIController {
            out_min: injection.min(MAX_CHARGING_GPM - 1.0),
            ..self.level_pi.clone()
        }
    }

    /// Initial state right after the bubble forms, before any loop runs.
    pub fn idle_state(&self, obs: &LevelObservation, charging_gpm: f64, letdown_gpm: f64) -> FlowControllerState {
        FlowControllerState {
            level_pi: PIControllerState::default(),
            charging_gpm,
            letdown_gpm,
            level_setpoint_pct: level_program(obs.loop_temp_f),
            path: select_letdown_path(obs.loop_temp_f, obs.pressure_psia, obs.level_pct),
        }
    }

    /// Flows held by an outside owner (bubble sequence or operator).
    ///
    /// The integral tracks the held charging so automatic control resumes
    /// without a bump. The letdown interlock still applies.
    pub fn held(
        &self,
        obs: &LevelObservation,
        held: &FlowOverride,
    ) -> (FlowControllerState, CvcsFlows) {
        let path = select_letdown_path(obs.loop_temp_f, obs.pressure_psia, obs.level_pct);
        let setpoint = level_program(obs.loop_temp_f);
        let letdown = if path == LetdownPath::Isolated {
            0.0
        } else {
            held.letdown_gpm
        };
        let (injection, ret) = seal_flows(obs.pumps_running);
        let level_pi = self
            .bounded(obs.pumps_running)
            .state_for_output(held.charging_gpm, obs.level_pct, setpoint);
        let state = FlowControllerState {
            level_pi,
            charging_gpm: held.charging_gpm,
            letdown_gpm: letdown,
            level_setpoint_pct: setpoint,
            path,
        };
        let flows = CvcsFlows {
            charging_gpm: held.charging_gpm,
            letdown_gpm: letdown,
            seal_injection_gpm: injection,
            seal_return_gpm: ret,
        };
        (state, flows)
    }

    /// Automatic level control for one tick.
    pub fn automatic(
        &self,
        state: &FlowControllerState,
        obs: &LevelObservation,
        dt_s: f64,
    ) -> (FlowControllerState, CvcsFlows) {
        let path = select_letdown_path(obs.loop_temp_f, obs.pressure_psia, obs.level_pct);
        let setpoint = level_program(obs.loop_temp_f);
        let (level_pi, charging) =
            self.bounded(obs.pumps_running)
                .update(&state.level_pi, obs.level_pct, setpoint, dt_s);
        let letdown = automatic_letdown_gpm(path, obs.pressure_psia, obs.level_pct, setpoint);
        let (injection, ret) = seal_flows(obs.pumps_running);
        let next = FlowControllerState {
            level_pi,
            charging_gpm: charging,
            letdown_gpm: letdown,
            level_setpoint_pct: setpoint,
            path,
        };
        let flows = CvcsFlows {
            charging_gpm: charging,
            letdown_gpm: letdown,
            seal_injection_gpm: injection,
            seal_return_gpm: ret,
        };
        (next, flows)
    }

    /// Hand level control to the PI loop with charging balancing letdown
    /// plus seal return, so the first automatic tick holds level.
    pub fn handoff_state(&self, obs: &LevelObservation) -> FlowControllerState {
        let path = select_letdown_path(obs.loop_temp_f, obs.pressure_psia, obs.level_pct);
        let setpoint = level_program(obs.loop_temp_f);
        let letdown = automatic_letdown_gpm(path, obs.pressure_psia, obs.level_pct, setpoint);
        let (_, ret) = seal_flows(obs.pumps_running);
        let balance = letdown + ret;
        FlowControllerState {
            level_pi: self.bounded(obs.pumps_running).state_for_output(
                balance,
                obs.level_pct,
                setpoint,
            ),
            charging_gpm: balance,
            letdown_gpm: letdown,
            level_setpoint_pct: setpoint,
            path,
        }
    }

    /// Pre-load the integral ahead of starting `pumps` reactor coolant pumps.
    ///
    /// Sized to the extra charging the pumps will demand: seal return leaves
    /// the system as soon as they turn.
    pub fn preload_pump_start(&self, state: &FlowControllerState, pumps: u8) -> FlowControllerState {
        let bias = PUMP_START_BIAS_GPM_PER_PUMP * f64::from(pumps);
        FlowControllerState {
            level_pi: self.bounded(pumps).biased(&state.level_pi, bias),
            ..*state
        }
    }
}
