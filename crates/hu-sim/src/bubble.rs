//! Bubble-formation sequence.
//!
//! ```text
//! NONE ─▶ DETECTION ─▶ VERIFICATION ─▶ DRAIN ─▶ STABILIZE ─▶ PRESSURIZE ─▶ COMPLETE
//!              ▲              │
//!              └── no cushion ┘
//! ```
//!
//! The steam space is seeded when the pressurizer reaches saturation; the
//! sequence then confirms a compressible cushion, drains level to its
//! two-phase target at a fixed net outflow and hands level to the automatic
//! controller before heaters raise pressure for pump start.

use crate::command::FlowOverride;
use crate::config::BubbleSequenceConfig;
use crate::flows::gpm_to_lbm_per_s;
use hu_core::constants::flow::{NORMAL_CHARGING_GPM, NORMAL_LETDOWN_GPM};
use hu_core::constants::plant::{LOOP_VOLUME_FT3, PZR_VOLUME_FT3};
use hu_core::constants::setpoints::PUMP_START_MIN_PSIA;
use hu_props::{liquid_density, system_compliance};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BubbleFormationPhase {
    #[default]
    None,
    Detection,
    Verification,
    Drain,
    Stabilize,
    Pressurize,
    Complete,
}

impl BubbleFormationPhase {
    /// Charging and letdown are fixed by the sequence itself.
    pub fn flows_fixed_by_sequence(self) -> bool {
        matches!(
            self,
            BubbleFormationPhase::Detection
                | BubbleFormationPhase::Verification
                | BubbleFormationPhase::Drain
        )
    }

    pub fn allows_pump_start(self) -> bool {
        self == BubbleFormationPhase::Complete
    }
}

impl fmt::Display for BubbleFormationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BubbleFormationPhase::None => "NONE",
            BubbleFormationPhase::Detection => "DETECTION",
            BubbleFormationPhase::Verification => "VERIFICATION",
            BubbleFormationPhase::Drain => "DRAIN",
            BubbleFormationPhase::Stabilize => "STABILIZE",
            BubbleFormationPhase::Pressurize => "PRESSURIZE",
            BubbleFormationPhase::Complete => "COMPLETE",
        };
        write!(f, "{name}")
    }
}

/// Plant condition the sequence decides on, taken after the tick's physics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceObservation {
    pub pressure_psia: f64,
    pub level_pct: f64,
    pub pzr_liquid_temp_f: f64,
    pub loop_temp_f: f64,
    pub pzr_liquid_volume_ft3: f64,
}

/// Drain progress, kept for the round-trip check.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DrainRecord {
    pub start_level_pct: f64,
    pub start_liquid_volume_ft3: f64,
    /// Time integral of net outflow as liquid volume (ft³).
    pub net_outflow_ft3: f64,
    pub last_level_pct: f64,
    /// Level rose on some drain tick.
    pub level_reversed: bool,
}

impl DrainRecord {
    /// Liquid volume removed from the pressurizer so far (ft³).
    pub fn volume_removed_ft3(&self, liquid_volume_ft3: f64) -> f64 {
        self.start_liquid_volume_ft3 - liquid_volume_ft3
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BubbleSequence {
    pub phase: BubbleFormationPhase,
    pub phase_time_s: f64,
    pub verification_start_psia: Option<f64>,
    pub drain: Option<DrainRecord>,
}

/// Pressure change a water-solid plant would show for the verification
/// letdown step (psi).
pub fn solid_equivalent_pressure_change(
    obs: &SequenceObservation,
    cfg: &BubbleSequenceConfig,
) -> f64 {
    let removed_lbm = gpm_to_lbm_per_s(cfg.verification_letdown_step_gpm) * cfg.verification_dwell_s;
    let removed_ft3 = removed_lbm / liquid_density(obs.loop_temp_f, obs.pressure_psia);
    let compliance = system_compliance(&[
        (PZR_VOLUME_FT3, obs.pzr_liquid_temp_f),
        (LOOP_VOLUME_FT3, obs.loop_temp_f),
    ]);
    removed_ft3 / compliance
}

impl BubbleSequence {
    /// Enter `phase` with its clock at zero.
    pub fn enter(&mut self, phase: BubbleFormationPhase, obs: &SequenceObservation) {
        self.phase = phase;
        self.phase_time_s = 0.0;
        match phase {
            BubbleFormationPhase::Verification => {
                self.verification_start_psia = Some(obs.pressure_psia);
            }
            BubbleFormationPhase::Drain => {
                self.drain = Some(DrainRecord {
                    start_level_pct: obs.level_pct,
                    start_liquid_volume_ft3: obs.pzr_liquid_volume_ft3,
                    net_outflow_ft3: 0.0,
                    last_level_pct: obs.level_pct,
                    level_reversed: false,
                });
            }
            _ => {}
        }
    }

    /// Flows the sequence holds in its owning phases.
    pub fn sequence_flows(&self, cfg: &BubbleSequenceConfig) -> Option<FlowOverride> {
        match self.phase {
            BubbleFormationPhase::Detection => Some(FlowOverride {
                charging_gpm: NORMAL_CHARGING_GPM,
                letdown_gpm: NORMAL_LETDOWN_GPM,
            }),
            BubbleFormationPhase::Verification => Some(FlowOverride {
                charging_gpm: NORMAL_CHARGING_GPM,
                letdown_gpm: NORMAL_LETDOWN_GPM + cfg.verification_letdown_step_gpm,
            }),
            BubbleFormationPhase::Drain => Some(FlowOverride {
                charging_gpm: cfg.drain_charging_gpm,
                letdown_gpm: cfg.drain_letdown_gpm,
            }),
            _ => None,
        }
    }

    /// Record one drain tick's net outflow (ft³ of liquid) and the level
    /// after it.
    pub fn record_drain(&mut self, net_outflow_ft3: f64, level_pct: f64) {
        if let Some(drain) = self.drain.as_mut() {
            drain.net_outflow_ft3 += net_outflow_ft3;
            if level_pct >= drain.last_level_pct {
                drain.level_reversed = true;
            }
            drain.last_level_pct = level_pct;
        }
    }

    /// Phase the sequence should move to after this tick, if any.
    ///
    /// NONE and COMPLETE have no timed exit: bubble formation itself moves
    /// NONE to DETECTION.
    pub fn next_phase(
        &self,
        obs: &SequenceObservation,
        cfg: &BubbleSequenceConfig,
    ) -> Option<BubbleFormationPhase> {
        let t = self.phase_time_s;
        match self.phase {
            BubbleFormationPhase::None | BubbleFormationPhase::Complete => None,
            BubbleFormationPhase::Detection => {
                (t >= cfg.detection_dwell_s).then_some(BubbleFormationPhase::Verification)
            }
            BubbleFormationPhase::Verification => {
                if t < cfg.verification_dwell_s {
                    return None;
                }
                let start = self.verification_start_psia.unwrap_or(obs.pressure_psia);
                let measured = (obs.pressure_psia - start).abs();
                let solid = solid_equivalent_pressure_change(obs, cfg);
                if measured < cfg.verification_pass_ratio * solid {
                    Some(BubbleFormationPhase::Drain)
                } else {
                    Some(BubbleFormationPhase::Detection)
                }
            }
            BubbleFormationPhase::Drain => (t >= cfg.drain_min_dwell_s
                && obs.level_pct <= cfg.drain_target_level_pct)
                .then_some(BubbleFormationPhase::Stabilize),
            BubbleFormationPhase::Stabilize => {
                (t >= cfg.stabilize_dwell_s).then_some(BubbleFormationPhase::Pressurize)
            }
            BubbleFormationPhase::Pressurize => (t >= cfg.pressurize_min_dwell_s
                && obs.pressure_psia >= PUMP_START_MIN_PSIA)
                .then_some(BubbleFormationPhase::Complete),
        }
    }
}
