//! Pump-driven heatup to hot standby.
//!
//! With the reactor coolant pumps running, pump heat alone carries the loop
//! up to no-load temperature. Two programs shape that approach:
//!
//! - the heater pressure setpoint tracks loop temperature, holding
//!   `subcooling_margin_f` of subcooling until it reaches hot-standby
//!   pressure;
//! - the steam dumps reject whatever pump heat would push the loop faster
//!   than the target heatup rate, then hold it at no-load temperature:
//!
//! ```text
//! dT/dt_allowed = min(rate, (T_no_load − T) / τ_approach)
//! Q_dump        = clamp(Q_pumps − Q_loss − C_loop · dT/dt_allowed, 0, Q_capacity)
//! ```

use crate::config::HeatupProgramConfig;
use hu_core::units::kw_to_btu_per_s;
use hu_props::saturation_pressure;

/// Heater pressure setpoint (psia) for the loop at `t_loop_f`, never below
/// `floor_psia`.
pub fn pressure_setpoint_psia(cfg: &HeatupProgramConfig, t_loop_f: f64, floor_psia: f64) -> f64 {
    saturation_pressure(t_loop_f + cfg.subcooling_margin_f)
        .min(cfg.hot_standby_pressure_psia)
        .max(floor_psia)
}

/// Loop heatup rate (°F/s) the steam dumps allow at `t_loop_f`.
pub fn allowed_heatup_rate_f_per_s(cfg: &HeatupProgramConfig, t_loop_f: f64) -> f64 {
    let approach = (cfg.no_load_temp_f - t_loop_f) / cfg.approach_time_s;
    (cfg.target_heatup_rate_f_per_hr / 3_600.0).min(approach)
}

/// Heat (BTU/s) the steam dumps reject.
///
/// `net_heat_btu_per_s` is pump heat less loop losses; `capacity_btu_per_f`
/// is coolant plus metal heat capacity of the loop.
pub fn steam_dump_btu_per_s(
    cfg: &HeatupProgramConfig,
    t_loop_f: f64,
    net_heat_btu_per_s: f64,
    capacity_btu_per_f: f64,
) -> f64 {
    let held = net_heat_btu_per_s - capacity_btu_per_f * allowed_heatup_rate_f_per_s(cfg, t_loop_f);
    held.clamp(0.0, kw_to_btu_per_s(cfg.steam_dump_capacity_kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hu_props::saturation_temperature;

    const CAPACITY: f64 = 950_000.0;

    #[test]
    fn pressure_program_keeps_the_margin_between_its_limits() {
        let cfg = HeatupProgramConfig::default();
        assert_eq!(pressure_setpoint_psia(&cfg, 160.0, 410.0), 410.0);
        let mid = pressure_setpoint_psia(&cfg, 400.0, 410.0);
        assert!((saturation_temperature(mid) - 500.0).abs() < 0.1);
        assert_eq!(pressure_setpoint_psia(&cfg, 557.0, 410.0), 2_235.0);
    }

    #[test]
    fn dumps_hold_the_target_rate_far_from_no_load() {
        let cfg = HeatupProgramConfig::default();
        let net = kw_to_btu_per_s(20_000.0);
        let q = steam_dump_btu_per_s(&cfg, 300.0, net, CAPACITY);
        let heatup_f_per_hr = (net - q) / CAPACITY * 3_600.0;
        assert!((heatup_f_per_hr - 50.0).abs() < 1e-9);
    }

    #[test]
    fn dumps_take_all_pump_heat_at_no_load() {
        let cfg = HeatupProgramConfig::default();
        let net = kw_to_btu_per_s(20_000.0);
        assert!((steam_dump_btu_per_s(&cfg, 557.0, net, CAPACITY) - net).abs() < 1e-9);
        // Above no-load the dumps cool the loop back down
        assert!(steam_dump_btu_per_s(&cfg, 560.0, net, CAPACITY) > net);
    }

    #[test]
    fn dumps_stay_closed_and_capped() {
        let cfg = HeatupProgramConfig::default();
        let slow = kw_to_btu_per_s(5_000.0);
        assert_eq!(steam_dump_btu_per_s(&cfg, 300.0, slow, CAPACITY), 0.0);
        let huge = kw_to_btu_per_s(100_000.0);
        assert_eq!(
            steam_dump_btu_per_s(&cfg, 557.0, huge, CAPACITY),
            kw_to_btu_per_s(cfg.steam_dump_capacity_kw)
        );
    }
}
