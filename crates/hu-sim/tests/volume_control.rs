//! Volume control tank flows as the snapshot reports them.

use hu_sim::{FlowOverride, HeatupSim, OperatorCommand, PlantConfig, Scenario};

fn standby_with(charging_gpm: f64, letdown_gpm: f64) -> HeatupSim {
    let mut sim = HeatupSim::new(Scenario::TwoPhaseStandby, PlantConfig::default()).unwrap();
    sim.apply(OperatorCommand::ManualFlowOverride(FlowOverride {
        charging_gpm,
        letdown_gpm,
    }))
    .unwrap();
    sim
}

#[test]
fn excess_letdown_fills_the_tank_until_it_diverts() {
    let mut sim = standby_with(32.0, 75.0);
    sim.step().unwrap();
    assert_eq!(sim.snapshot().divert_gpm, 0.0);

    sim.run_for(900.0).unwrap();
    let snap = sim.snapshot();
    assert!(snap.tank_level_pct > 70.0, "tank at {} %", snap.tank_level_pct);
    assert!(sim.tank().divert_active);
    assert!(
        snap.divert_gpm > 0.0 && snap.divert_gpm <= snap.letdown_gpm,
        "divert {} gpm",
        snap.divert_gpm
    );
    assert_eq!(snap.makeup_gpm, 0.0);
    assert!(sim.tank().accumulator.divert_lbm > 0.0);
    assert!(sim.mass_ledger().max_abs_error_lbm < 1.0);
}

#[test]
fn excess_charging_drains_the_tank_into_makeup() {
    let mut sim = standby_with(120.0, 75.0);
    sim.run_for(1_300.0).unwrap();
    let snap = sim.snapshot();
    assert!(sim.tank().makeup_active, "tank at {} %", snap.tank_level_pct);
    assert_eq!(snap.makeup_gpm, 80.0);
    assert_eq!(snap.divert_gpm, 0.0);
    assert!(sim.mass_ledger().max_abs_error_lbm < 1.0);
}
