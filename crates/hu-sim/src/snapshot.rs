//! Read-only per-tick view of the plant for presentation layers.

use crate::alarms::Alarms;
use crate::bubble::BubbleFormationPhase;
use crate::flow_control::LetdownPath;
use crate::pressurizer::PhaseChangeRates;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverDiagnostics {
    /// Ticks whose coupled solve did not converge.
    pub nonconverged_count: u64,
    pub last_iterations: usize,
    pub last_converged: bool,
    pub last_clamped: bool,
    /// Ticks whose solve moved inventory past the drift limit.
    pub drift_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub time_s: f64,
    pub phase: BubbleFormationPhase,
    pub phase_time_s: f64,
    pub solid: bool,

    pub pressure_psia: f64,
    pub loop_temp_f: f64,
    pub pzr_liquid_temp_f: f64,
    pub pzr_vapor_temp_f: f64,
    pub pzr_wall_temp_f: f64,
    pub subcooling_f: f64,
    pub heatup_rate_f_per_hr: f64,

    pub pzr_level_pct: f64,
    pub pzr_liquid_volume_ft3: f64,
    pub pzr_vapor_volume_ft3: f64,
    pub pzr_liquid_mass_lbm: f64,
    pub pzr_vapor_mass_lbm: f64,
    pub loop_mass_lbm: f64,
    pub rcs_mass_lbm: f64,

    pub charging_gpm: f64,
    pub letdown_gpm: f64,
    pub seal_injection_gpm: f64,
    pub seal_return_gpm: f64,
    pub relief_gpm: f64,
    pub spray_gpm: f64,
    pub letdown_path: LetdownPath,
    pub flow_override: bool,
    /// Letdown diverted from the volume control tank to holdup (gpm).
    pub divert_gpm: f64,
    /// Blended makeup into the volume control tank (gpm).
    pub makeup_gpm: f64,

    pub tank_level_pct: f64,
    pub tank_boron_ppm: f64,
    pub rcs_boron_ppm: f64,

    /// Heater demand as a fraction of capacity.
    pub heater_demand: f64,
    pub heater_effective_kw: f64,
    pub heater_setpoint_psia: f64,
    pub steam_dump_kw: f64,
    pub phase_change: PhaseChangeRates,
    pub pumps_running: u8,

    pub solver: SolverDiagnostics,
    pub alarms: Alarms,
    /// Mass ledger mismatch at the last check (lbm).
    pub mass_error_lbm: f64,
    pub energy_imbalance_btu: f64,
    pub time_acceleration: f64,
}
