//! Pump heatup from cold shutdown to hot standby.

use hu_core::constants::setpoints::{HOT_STANDBY_PRESSURE_PSIA, NO_LOAD_TEMP_F};
use hu_sim::{BubbleFormationPhase, HeatupSim, OperatorCommand, PlantConfig, Scenario};

const HOUR_S: u64 = 3_600;

#[test]
fn pump_heatup_reaches_hot_standby_subcooled() {
    let mut sim = HeatupSim::new(Scenario::ColdShutdown, PlantConfig::default()).unwrap();
    while sim.phase() != BubbleFormationPhase::Complete {
        sim.step().expect("tick failed before pump start");
        assert!(sim.time_s() < 40_000.0, "stuck in {}", sim.phase());
    }
    sim.apply(OperatorCommand::StartReactorCoolantPumps).unwrap();
    let start = sim.snapshot();
    let heat_in_before = sim.energy_ledger().heat_in_btu;

    let mut min_subcooling = f64::MAX;
    let mut level_range = (f64::MAX, f64::MIN);
    let mut hourly = vec![start.loop_temp_f];
    for tick in 1..=10 * HOUR_S {
        if let Err(e) = sim.step() {
            panic!("tick {tick} after pump start failed: {e}");
        }
        let snap = sim.snapshot();
        min_subcooling = min_subcooling.min(snap.subcooling_f);
        level_range = (
            level_range.0.min(snap.pzr_level_pct),
            level_range.1.max(snap.pzr_level_pct),
        );
        assert!(!snap.alarms.pzr_full, "pressurizer filled at t={} s", snap.time_s);
        if tick % HOUR_S == 0 {
            hourly.push(snap.loop_temp_f);
        }
    }

    assert!(min_subcooling > 50.0, "subcooling fell to {min_subcooling} °F");
    assert!(
        level_range.0 > 17.0 && level_range.1 < 61.5,
        "level ranged over {level_range:?}"
    );
    // Heats through the first six hours, never faster than the dumps allow
    for pair in hourly[..7].windows(2) {
        let rise = pair[1] - pair[0];
        assert!(rise > 20.0 && rise < 55.0, "hourly rise {rise} °F in {hourly:?}");
    }

    let end = sim.snapshot();
    assert_eq!(end.solver.nonconverged_count, start.solver.nonconverged_count);
    assert_eq!(end.solver.drift_count, 0);
    assert!((end.loop_temp_f - NO_LOAD_TEMP_F).abs() < 2.0, "loop at {} °F", end.loop_temp_f);
    assert!(
        (end.pressure_psia - HOT_STANDBY_PRESSURE_PSIA).abs() < 30.0,
        "pressure {} psia",
        end.pressure_psia
    );
    assert_eq!(end.heater_setpoint_psia, HOT_STANDBY_PRESSURE_PSIA);
    assert!(end.steam_dump_kw > 0.0);
    assert!(sim.mass_ledger().max_abs_error_lbm < 1.0);

    let pumped_heat = sim.energy_ledger().heat_in_btu - heat_in_before;
    assert!(
        sim.energy_ledger().imbalance_btu.abs() < 0.01 * pumped_heat,
        "imbalance {} BTU against {pumped_heat} BTU of heat",
        sim.energy_ledger().imbalance_btu
    );
}
