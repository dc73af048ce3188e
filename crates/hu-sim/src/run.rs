//! Batch runner and result recording.

use crate::bubble::BubbleFormationPhase;
use crate::command::OperatorCommand;
use crate::config::PlantConfig;
use crate::error::{SimError, SimResult};
use crate::scenario::Scenario;
use crate::sim::HeatupSim;
use crate::snapshot::PlantSnapshot;
use tracing::{info, info_span, warn};

/// Options for batch runs.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Simulated duration (seconds)
    pub duration_s: f64,
    /// Record every N-th tick (decimation)
    pub record_every: usize,
    /// Start the reactor coolant pumps as soon as the bubble is complete
    pub start_pumps_when_complete: bool,
    /// Stop once the pumps have run this long (seconds)
    pub stop_after_pumps_s: Option<f64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            duration_s: 8.0 * 3_600.0,
            record_every: 60,
            start_pumps_when_complete: false,
            stop_after_pumps_s: None,
        }
    }
}

/// Record of a run.
#[derive(Clone, Debug, Default)]
pub struct SimRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Snapshots
    pub x: Vec<PlantSnapshot>,
}

impl SimRecord {
    pub fn last(&self) -> Option<&PlantSnapshot> {
        self.x.last()
    }
}

/// Advance `sim` by `opts.duration_s`, recording snapshots.
pub fn run(sim: &mut HeatupSim, opts: &RunOptions) -> SimResult<SimRecord> {
    if !(opts.duration_s.is_finite() && opts.duration_s >= 0.0) {
        return Err(SimError::InvalidArg {
            what: "duration must be non-negative",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let dt = sim.config().dt_s;
    let max_ticks = (opts.duration_s / dt + 1e-9).floor() as usize;
    let mut record = SimRecord {
        t: vec![sim.time_s()],
        x: vec![sim.snapshot()],
    };
    let mut pumps_started_at: Option<f64> = None;

    let mut tick = 0;
    while tick < max_ticks {
        sim.step()?;
        tick += 1;

        if opts.start_pumps_when_complete
            && sim.phase() == BubbleFormationPhase::Complete
            && sim.pumps_running() == 0
        {
            match sim.apply(OperatorCommand::StartReactorCoolantPumps) {
                Ok(()) => pumps_started_at = Some(sim.time_s()),
                Err(rejection) => warn!(%rejection, "pump start refused"),
            }
        }

        if tick % opts.record_every == 0 {
            record.t.push(sim.time_s());
            record.x.push(sim.snapshot());
        }

        if let (Some(start), Some(limit)) = (pumps_started_at, opts.stop_after_pumps_s) {
            if sim.time_s() - start >= limit {
                break;
            }
        }
    }

    // Always record final state
    if tick % opts.record_every != 0 {
        record.t.push(sim.time_s());
        record.x.push(sim.snapshot());
    }
    Ok(record)
}

/// Build `scenario` under `config` and run it.
pub fn run_scenario(
    scenario: Scenario,
    config: PlantConfig,
    opts: &RunOptions,
) -> SimResult<SimRecord> {
    let span = info_span!("scenario", scenario = %scenario);
    let _enter = span.enter();
    let mut sim = HeatupSim::new(scenario, config)?;
    let record = run(&mut sim, opts)?;
    info!(
        time_s = sim.time_s(),
        phase = %sim.phase(),
        max_mass_error_lbm = sim.mass_ledger().max_abs_error_lbm,
        "run finished"
    );
    Ok(record)
}
