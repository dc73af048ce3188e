//! Plant configuration.
//!
//! Values an operator or scenario author may change without rebuilding.
//! Geometry and interlock setpoints are fixed in `hu_core::constants`.

use crate::error::{SimError, SimResult};
use hu_core::constants::plant::PZR_HEATER_CAPACITY_KW;
use hu_core::constants::setpoints::{HOT_STANDBY_PRESSURE_PSIA, NO_LOAD_TEMP_F};
use hu_solver::{PressureBand, SolverConfig};
use serde::{Deserialize, Serialize};

/// Lumped heat-transfer conductances (BTU/(s·°F)).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatTransferConfig {
    /// Pressurizer to loop through the surge line, water-solid only.
    pub surge_line_ua: f64,
    /// Pressurizer shell to containment.
    pub pzr_ambient_ua: f64,
    /// Loop piping and vessel to containment.
    pub loop_ambient_ua: f64,
}

impl Default for HeatTransferConfig {
    fn default() -> Self {
        Self {
            surge_line_ua: 0.5,
            pzr_ambient_ua: 0.15,
            loop_ambient_ua: 1.0,
        }
    }
}

/// Bubble-formation sequence timing and targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleSequenceConfig {
    /// Level at which the steam space is seeded when the bubble forms (%).
    pub seed_level_pct: f64,
    pub detection_dwell_s: f64,
    pub verification_dwell_s: f64,
    /// Extra letdown applied during verification (gpm).
    pub verification_letdown_step_gpm: f64,
    /// Verification passes when the measured pressure change is below this
    /// fraction of what a water-solid plant would show.
    pub verification_pass_ratio: f64,
    pub drain_charging_gpm: f64,
    pub drain_letdown_gpm: f64,
    pub drain_target_level_pct: f64,
    pub drain_min_dwell_s: f64,
    pub stabilize_dwell_s: f64,
    /// Heater pressure setpoint from PRESSURIZE onward (psia).
    pub pressurize_setpoint_psia: f64,
    pub pressurize_min_dwell_s: f64,
}

impl Default for BubbleSequenceConfig {
    fn default() -> Self {
        Self {
            seed_level_pct: 95.0,
            detection_dwell_s: 60.0,
            verification_dwell_s: 120.0,
            verification_letdown_step_gpm: 10.0,
            verification_pass_ratio: 0.25,
            drain_charging_gpm: 45.0,
            drain_letdown_gpm: 120.0,
            drain_target_level_pct: 25.0,
            drain_min_dwell_s: 300.0,
            stabilize_dwell_s: 300.0,
            pressurize_setpoint_psia: 410.0,
            pressurize_min_dwell_s: 60.0,
        }
    }
}

/// Pump-driven heatup from bubble completion to hot standby.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatupProgramConfig {
    /// Subcooling the heater pressure setpoint keeps over the loop (°F).
    pub subcooling_margin_f: f64,
    /// Where the pressure program stops rising (psia).
    pub hot_standby_pressure_psia: f64,
    /// Loop temperature the steam dumps hold at hot standby (°F).
    pub no_load_temp_f: f64,
    /// Loop heatup rate the steam dumps allow with pumps running (°F/hr).
    pub target_heatup_rate_f_per_hr: f64,
    /// Time constant of the final approach to no-load temperature (s).
    pub approach_time_s: f64,
    pub steam_dump_capacity_kw: f64,
}

impl Default for HeatupProgramConfig {
    fn default() -> Self {
        Self {
            subcooling_margin_f: 100.0,
            hot_standby_pressure_psia: HOT_STANDBY_PRESSURE_PSIA,
            no_load_temp_f: NO_LOAD_TEMP_F,
            target_heatup_rate_f_per_hr: 50.0,
            approach_time_s: 1_800.0,
            steam_dump_capacity_kw: 40_000.0,
        }
    }
}

/// Host frame limits for time acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeBudgetConfig {
    pub max_time_acceleration: f64,
    /// Wall time credited per frame at most (s); a longer stall is dropped.
    pub max_frame_wall_s: f64,
    pub max_ticks_per_frame: usize,
}

impl Default for TimeBudgetConfig {
    fn default() -> Self {
        Self {
            max_time_acceleration: 1_000.0,
            max_frame_wall_s: 0.5,
            max_ticks_per_frame: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Physics timestep (s).
    pub dt_s: f64,
    pub ambient_temp_f: f64,
    pub heat_transfer: HeatTransferConfig,
    pub heater_capacity_kw: f64,
    /// Heater demand while water-solid, as a fraction of capacity.
    pub solid_heater_demand: f64,
    /// Residual heat removal pump heat while it circulates the loop (kW).
    pub rhr_pump_heat_kw: f64,
    /// Heat from each running reactor coolant pump (kW).
    pub rcp_heat_kw: f64,
    /// Thermal damping of the steam cushion without forced flow.
    ///
    /// Empirical: validated against the reference heatup only.
    pub thermal_damping: f64,
    pub solver: SolverConfig,
    pub pressure_band: PressureBand,
    pub bubble: BubbleSequenceConfig,
    pub heatup: HeatupProgramConfig,
    /// Allowed mismatch between RCS inventory and the flow ledger (lbm).
    pub mass_tolerance_lbm: f64,
    pub time: TimeBudgetConfig,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            dt_s: 1.0,
            ambient_temp_f: 80.0,
            heat_transfer: HeatTransferConfig::default(),
            heater_capacity_kw: PZR_HEATER_CAPACITY_KW,
            solid_heater_demand: 1.0,
            rhr_pump_heat_kw: 500.0,
            rcp_heat_kw: 5_250.0,
            thermal_damping: 0.5,
            solver: SolverConfig::default(),
            pressure_band: PressureBand::HEATUP,
            bubble: BubbleSequenceConfig::default(),
            heatup: HeatupProgramConfig::default(),
            mass_tolerance_lbm: 1.0,
            time: TimeBudgetConfig::default(),
        }
    }
}

fn config_err(what: &str) -> SimError {
    SimError::Config {
        what: what.to_string(),
    }
}

impl PlantConfig {
    pub fn from_yaml_str(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt_s.is_finite() && self.dt_s > 0.0) {
            return Err(config_err("dt_s must be positive"));
        }
        if !(0.0..=1.0).contains(&self.thermal_damping) {
            return Err(config_err("thermal_damping must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.solid_heater_demand) {
            return Err(config_err("solid_heater_demand must be in [0, 1]"));
        }
        let ht = &self.heat_transfer;
        if [ht.surge_line_ua, ht.pzr_ambient_ua, ht.loop_ambient_ua]
            .iter()
            .any(|ua| !(ua.is_finite() && *ua >= 0.0))
        {
            return Err(config_err("heat transfer UA values must be non-negative"));
        }
        if [self.heater_capacity_kw, self.rhr_pump_heat_kw, self.rcp_heat_kw]
            .iter()
            .any(|q| !(q.is_finite() && *q >= 0.0))
        {
            return Err(config_err("heat sources must be non-negative"));
        }
        hu_props::validate_liquid_state(self.ambient_temp_f, 14.7)?;
        self.solver.validate()?;
        self.pressure_band.validate()?;

        let b = &self.bubble;
        if !(b.seed_level_pct > 0.0 && b.seed_level_pct < 100.0) {
            return Err(config_err("seed_level_pct must be in (0, 100)"));
        }
        if !(b.drain_target_level_pct > 0.0 && b.drain_target_level_pct < b.seed_level_pct) {
            return Err(config_err("drain target level must be below the seed level"));
        }
        if b.drain_letdown_gpm <= b.drain_charging_gpm {
            return Err(config_err("drain letdown must exceed drain charging"));
        }
        if [
            b.detection_dwell_s,
            b.verification_dwell_s,
            b.drain_min_dwell_s,
            b.stabilize_dwell_s,
            b.pressurize_min_dwell_s,
        ]
        .iter()
        .any(|d| !(d.is_finite() && *d >= 0.0))
        {
            return Err(config_err("dwell times must be non-negative"));
        }
        if !(b.verification_pass_ratio > 0.0 && b.verification_pass_ratio < 1.0) {
            return Err(config_err("verification_pass_ratio must be in (0, 1)"));
        }
        if !self.pressure_band.contains(b.pressurize_setpoint_psia) {
            return Err(config_err("pressurize setpoint outside the pressure band"));
        }
        let h = &self.heatup;
        if !(h.subcooling_margin_f.is_finite() && h.subcooling_margin_f >= 0.0) {
            return Err(config_err("heatup subcooling margin must be non-negative"));
        }
        if !(h.hot_standby_pressure_psia >= b.pressurize_setpoint_psia
            && self.pressure_band.contains(h.hot_standby_pressure_psia))
        {
            return Err(config_err(
                "hot standby pressure must lie between the pressurize setpoint and the band ceiling",
            ));
        }
        hu_props::validate_liquid_state(h.no_load_temp_f, h.hot_standby_pressure_psia)?;
        if [
            h.target_heatup_rate_f_per_hr,
            h.approach_time_s,
            h.steam_dump_capacity_kw,
        ]
        .iter()
        .any(|v| !(v.is_finite() && *v > 0.0))
        {
            return Err(config_err("heatup rate, approach time and dump capacity must be positive"));
        }
        if !(self.mass_tolerance_lbm.is_finite() && self.mass_tolerance_lbm >= 0.0) {
            return Err(config_err("mass_tolerance_lbm must be non-negative"));
        }
        let t = &self.time;
        if !(t.max_time_acceleration >= 1.0 && t.max_frame_wall_s > 0.0 && t.max_ticks_per_frame > 0)
        {
            return Err(config_err("time budget limits must be positive"));
        }
        Ok(())
    }
}
