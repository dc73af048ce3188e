//! Bubble drain: monotone level and the volume round trip.

use hu_sim::{BubbleFormationPhase, HeatupSim, PlantConfig, Scenario};

#[test]
fn drain_level_falls_every_tick_and_volume_round_trips() {
    let mut sim = HeatupSim::new(Scenario::SolidNearSaturation, PlantConfig::default()).unwrap();
    while sim.phase() != BubbleFormationPhase::Drain {
        sim.step().unwrap();
        assert!(sim.time_s() < 20_000.0, "drain never started");
    }

    let target = sim.config().bubble.drain_target_level_pct;
    let mut last_level = sim.snapshot().pzr_level_pct;
    let mut drain_ticks = 0;
    while sim.phase() == BubbleFormationPhase::Drain {
        sim.step().unwrap();
        drain_ticks += 1;
        let snap = sim.snapshot();
        if snap.phase == BubbleFormationPhase::Drain {
            assert!(
                snap.pzr_level_pct < last_level,
                "level rose at t={} s: {} -> {}",
                snap.time_s,
                last_level,
                snap.pzr_level_pct
            );
            assert_eq!(snap.charging_gpm, 45.0);
            assert_eq!(snap.letdown_gpm, 120.0);
        }
        last_level = snap.pzr_level_pct;
        assert!(drain_ticks < 20_000, "drain never reached target");
    }

    assert_eq!(sim.phase(), BubbleFormationPhase::Stabilize);
    let snap = sim.snapshot();
    assert!(snap.pzr_level_pct <= target);
    assert!(drain_ticks as f64 >= sim.config().bubble.drain_min_dwell_s);

    let drain = sim.sequence().drain.expect("drain record");
    assert!(!drain.level_reversed);
    let removed = drain.volume_removed_ft3(snap.pzr_liquid_volume_ft3);
    let integral = drain.net_outflow_ft3;
    assert!(removed > 0.0 && integral > 0.0);
    assert!(
        ((removed - integral) / integral).abs() < 0.03,
        "removed {removed} ft³ against a net outflow of {integral} ft³"
    );
    assert!(sim.mass_ledger().max_abs_error_lbm < 1.0);
}
