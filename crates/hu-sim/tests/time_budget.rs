//! Host frames at time acceleration.

use hu_sim::{HeatupSim, OperatorCommand, PlantConfig, Scenario};

#[test]
fn accelerated_frame_runs_whole_ticks() {
    let mut sim = HeatupSim::new(Scenario::ColdShutdown, PlantConfig::default()).unwrap();
    sim.apply(OperatorCommand::SetTimeAcceleration { multiplier: 100.0 })
        .unwrap();

    let report = sim.run_frame(0.5).unwrap();
    assert_eq!(report.ticks, 50);
    assert_eq!(report.simulated_s, 50.0);
    assert_eq!(report.dropped_wall_s, 0.0);
    assert_eq!(sim.time_s(), 50.0);
}

#[test]
fn stalled_host_is_capped() {
    let mut sim = HeatupSim::new(Scenario::ColdShutdown, PlantConfig::default()).unwrap();
    sim.apply(OperatorCommand::SetTimeAcceleration { multiplier: 100.0 })
        .unwrap();

    let report = sim.run_frame(30.0).unwrap();
    assert_eq!(report.ticks, 50);
    assert!((report.dropped_wall_s - 29.5).abs() < 1e-12);
    assert_eq!(sim.time_s(), 50.0);
}

#[test]
fn fractional_ticks_carry_between_frames() {
    let mut sim = HeatupSim::new(Scenario::ColdShutdown, PlantConfig::default()).unwrap();
    // 0.4 s of simulated time per 16 ms frame
    sim.apply(OperatorCommand::SetTimeAcceleration { multiplier: 25.0 })
        .unwrap();
    let ticks: usize = (0..10)
        .map(|_| sim.run_frame(0.016).unwrap().ticks)
        .sum();
    assert_eq!(ticks, 4);
    assert_eq!(sim.time_s(), 4.0);
}

#[test]
fn maximum_acceleration_is_bounded_per_frame() {
    let mut sim = HeatupSim::new(Scenario::ColdShutdown, PlantConfig::default()).unwrap();
    sim.apply(OperatorCommand::SetTimeAcceleration { multiplier: 1_000.0 })
        .unwrap();
    let limit = sim.config().time.max_ticks_per_frame;
    let report = sim.run_frame(0.5).unwrap();
    assert_eq!(report.ticks, limit);
    assert!(report.carried_s <= limit as f64 * sim.config().dt_s);
}
