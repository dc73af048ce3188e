//! Scenario orchestrator.
//!
//! [`HeatupSim`] owns the one authoritative plant state and advances it one
//! fixed tick at a time, in this order:
//!
//! 1. phase dispatch and flow selection
//! 2. heater pressure control, on the heatup pressure program once the
//!    pumps run
//! 3. loop heat balance, less steam dump heat
//! 4. coupled solve
//! 5. insurge mixing
//! 6. pressurizer phase change
//! 7. flow application
//! 8. inventory tank
//! 9. bubble sequence
//! 10. conservation check
//! 11. alarms
//!
//! While water-solid, steps 2 to 7 collapse into the solid-plant step.

use crate::alarms::{AlarmInputs, Alarms};
use crate::bubble::{BubbleFormationPhase, BubbleSequence, SequenceObservation};
use crate::command::{
    CommandRejection, FlowOverride, OperatorCommand, RELIEF_TEST_DURATION_S, RELIEF_TEST_GPM,
};
use crate::config::PlantConfig;
use crate::error::{SimError, SimResult};
use crate::flow_control::{
    LetdownPath, LevelObservation, TwoPhaseFlowController, select_letdown_path,
};
use crate::flows::CvcsFlows;
use crate::heatup;
use crate::host::{FrameReport, TimeBudget};
use crate::ledger::{EnergyLedger, MassLedger};
use crate::plant::{PlantMode, TwoPhasePlant};
use crate::pressurizer::{self, PhaseChangeRates, PressurizerInputs, PressurizerState, spray_flow_gpm};
use crate::scenario::{InitialConditions, Scenario, TwoPhaseStart};
use crate::snapshot::{PlantSnapshot, SolverDiagnostics};
use crate::solid_plant::{SolidInputs, SolidPlantController, SolidPlantState};
use crate::tank::{InventoryTank, TankState, TankStepResult};
use hu_controls::PIController;
use hu_core::constants::plant::{
    PZR_VOLUME_FT3, PZR_WALL_HEAT_CAPACITY_BTU_PER_F, RCP_COUNT, RCS_METAL_HEAT_CAPACITY_BTU_PER_F,
};
use hu_core::units::{BTU_PER_KW_S, kw_to_btu_per_s};
use hu_props::{
    liquid_density, saturated_liquid_enthalpy, saturated_vapor_enthalpy, saturation_temperature,
    specific_heat, temperature_change_from_heat,
};
use hu_solver::{SolveInput, SolveOutcome, SystemState, solve_equilibrium};
use tracing::{info, warn};

/// Heater demand per psi of pressure error.
const HEATER_KP: f64 = 1.0 / 30.0;
const HEATER_TI_S: f64 = 900.0;
/// Largest fractional inventory change one coupled solve may introduce.
const SOLVER_DRIFT_LIMIT: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
struct Controllers {
    solid: SolidPlantController,
    flow: TwoPhaseFlowController,
    heater: PIController,
    tank: InventoryTank,
}

impl Controllers {
    fn new() -> SimResult<Self> {
        Ok(Self {
            solid: SolidPlantController::new()?,
            flow: TwoPhaseFlowController::new()?,
            heater: PIController::new(HEATER_KP, HEATER_TI_S, 0.0, 1.0)?,
            tank: InventoryTank::new()?,
        })
    }
}

/// Everything a reset restores.
#[derive(Debug, Clone, PartialEq)]
struct SimState {
    time_s: f64,
    mode: PlantMode,
    sequence: BubbleSequence,
    tank: TankState,
    mass: MassLedger,
    energy: EnergyLedger,
    solver: SolverDiagnostics,
    pumps_running: u8,
    flow_override: Option<FlowOverride>,
    relief_test_remaining_s: f64,
    flows: CvcsFlows,
    tank_flows: TankStepResult,
    spray_gpm: f64,
    steam_dump_kw: f64,
    pzr_full: bool,
    heatup_rate_f_per_hr: f64,
    alarms: Alarms,
}

fn mix(mass_a: f64, temp_a: f64, mass_b: f64, temp_b: f64) -> f64 {
    (mass_a * temp_a + mass_b * temp_b) / (mass_a + mass_b)
}

fn level_observation(plant: &TwoPhasePlant, pumps_running: u8) -> LevelObservation {
    LevelObservation {
        level_pct: plant.level_pct(),
        loop_temp_f: plant.system.loop_temp_f,
        pressure_psia: plant.system.pressure_psia,
        pumps_running,
    }
}

fn sequence_observation(plant: &TwoPhasePlant) -> SequenceObservation {
    SequenceObservation {
        pressure_psia: plant.system.pressure_psia,
        level_pct: plant.level_pct(),
        pzr_liquid_temp_f: plant.pressurizer.liquid_temp_f,
        loop_temp_f: plant.system.loop_temp_f,
        pzr_liquid_volume_ft3: plant.system.pressurizer.liquid_volume_ft3,
    }
}

/// Stored energy of coolant and metal (BTU), saturated-liquid enthalpy basis.
fn energy_content_btu(mode: &PlantMode) -> f64 {
    match mode {
        PlantMode::Solid(s) => {
            let pzr_mass = s.pzr_mass_lbm();
            (s.total_mass_lbm - pzr_mass) * saturated_liquid_enthalpy(s.loop_temp_f)
                + pzr_mass * saturated_liquid_enthalpy(s.pzr_temp_f)
                + PZR_WALL_HEAT_CAPACITY_BTU_PER_F * s.pzr_temp_f
                + RCS_METAL_HEAT_CAPACITY_BTU_PER_F * s.loop_temp_f
        }
        PlantMode::TwoPhase(p) => {
            let inv = &p.system.pressurizer;
            let t_sat = saturation_temperature(p.system.pressure_psia);
            p.system.loop_mass_lbm * saturated_liquid_enthalpy(p.system.loop_temp_f)
                + inv.liquid_mass_lbm * saturated_liquid_enthalpy(p.pressurizer.liquid_temp_f)
                + inv.vapor_mass_lbm * saturated_vapor_enthalpy(t_sat)
                + PZR_WALL_HEAT_CAPACITY_BTU_PER_F * p.pressurizer.wall_temp_f
                + RCS_METAL_HEAT_CAPACITY_BTU_PER_F * p.system.loop_temp_f
        }
    }
}

/// Two-phase plant at rest with heaters carrying the shell losses.
fn standby_plant(
    ic: &InitialConditions,
    start: &TwoPhaseStart,
    config: &PlantConfig,
    ctl: &Controllers,
) -> SimResult<TwoPhasePlant> {
    let p = ic.pressure_psia;
    let system = SystemState::two_phase(p, ic.loop_temp_f, ic.pzr_temp_f, start.level_pct)?;
    let loss_kw =
        config.heat_transfer.pzr_ambient_ua * (ic.pzr_temp_f - config.ambient_temp_f) / BTU_PER_KW_S;
    let demand = if config.heater_capacity_kw > 0.0 {
        (loss_kw / config.heater_capacity_kw).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut plant = TwoPhasePlant {
        system,
        pressurizer: PressurizerState::saturated(p, ic.pzr_temp_f, demand * config.heater_capacity_kw),
        flow: ctl.flow.handoff_state(&LevelObservation {
            level_pct: system.level_pct(),
            loop_temp_f: ic.loop_temp_f,
            pressure_psia: p,
            pumps_running: 0,
        }),
        heater_control: ctl.heater.state_for_output(demand, p, start.heater_setpoint_psia),
        heater_setpoint_psia: start.heater_setpoint_psia,
        heater_demand: demand,
    };
    plant.pressurizer.wall_temp_f = ic.pzr_temp_f;
    Ok(plant)
}

impl SimState {
    fn initial(scenario: Scenario, config: &PlantConfig, ctl: &Controllers) -> SimResult<Self> {
        let ic = scenario.initial_conditions();
        let (mode, sequence, flows) = match ic.two_phase {
            None => {
                let solid = SolidPlantState::new(ic.pressure_psia, ic.pzr_temp_f, ic.loop_temp_f)?;
                (PlantMode::Solid(solid), BubbleSequence::default(), solid.flows())
            }
            Some(start) => {
                let plant = standby_plant(&ic, &start, config, ctl)?;
                let sequence = BubbleSequence {
                    phase: start.phase,
                    ..BubbleSequence::default()
                };
                let flows = CvcsFlows {
                    charging_gpm: plant.flow.charging_gpm,
                    letdown_gpm: plant.flow.letdown_gpm,
                    ..CvcsFlows::default()
                };
                (PlantMode::TwoPhase(Box::new(plant)), sequence, flows)
            }
        };
        let mut state = Self {
            time_s: 0.0,
            mass: MassLedger::new(mode.rcs_mass_lbm()),
            energy: EnergyLedger::new(energy_content_btu(&mode)),
            mode,
            sequence,
            tank: TankState::new(ic.tank_level_pct, ic.boron_ppm),
            solver: SolverDiagnostics {
                last_converged: true,
                ..SolverDiagnostics::default()
            },
            pumps_running: 0,
            flow_override: None,
            relief_test_remaining_s: 0.0,
            flows,
            tank_flows: TankStepResult::default(),
            spray_gpm: 0.0,
            steam_dump_kw: 0.0,
            pzr_full: false,
            heatup_rate_f_per_hr: 0.0,
            alarms: Alarms::default(),
        };
        state.refresh_alarms();
        Ok(state)
    }

    fn tick_solid(
        &mut self,
        ctl: &Controllers,
        cfg: &PlantConfig,
        solid: SolidPlantState,
        dt: f64,
    ) -> SimResult<()> {
        let relief_test_gpm = if self.relief_test_remaining_s > 0.0 {
            RELIEF_TEST_GPM
        } else {
            0.0
        };
        let inputs = SolidInputs {
            heater_command_kw: cfg.solid_heater_demand * cfg.heater_capacity_kw,
            loop_heat_kw: cfg.rhr_pump_heat_kw,
            ambient_temp_f: cfg.ambient_temp_f,
            heat_transfer: cfg.heat_transfer,
            flow_override: self.flow_override,
            relief_test_gpm,
        };
        let (next, result) = ctl.solid.step(&solid, &inputs, dt);
        self.relief_test_remaining_s = (self.relief_test_remaining_s - dt).max(0.0);
        if result.relief_lifted {
            warn!(time_s = self.time_s, pressure_psia = solid.pressure_psia, "relief lifted");
        }
        if result.relief_reseated {
            warn!(time_s = self.time_s, pressure_psia = solid.pressure_psia, "relief reseated");
        }

        let (tank, tank_flows) = ctl.tank.step(&self.tank, &result.flows, next.total_mass_lbm, dt);
        self.tank = tank;
        self.tank_flows = tank_flows;
        self.mass.record_relief(result.relief_lbm);
        let advected = (result.flows.net_to_rcs_lbm(dt) - result.relief_lbm)
            * saturated_liquid_enthalpy(solid.loop_temp_f);
        self.energy
            .record(result.heat_in_btu, result.heat_loss_btu, advected);
        self.flows = result.flows;
        self.spray_gpm = 0.0;
        self.steam_dump_kw = 0.0;
        self.pzr_full = false;
        self.mode = PlantMode::Solid(next);
        self.sequence.phase_time_s += dt;

        if next.bubble_ready && self.sequence.phase == BubbleFormationPhase::None {
            self.form_bubble(ctl, cfg, &next)?;
        }
        Ok(())
    }

    fn form_bubble(
        &mut self,
        ctl: &Controllers,
        cfg: &PlantConfig,
        solid: &SolidPlantState,
    ) -> SimResult<()> {
        let content_before = energy_content_btu(&self.mode);
        self.mode
            .form_bubble(cfg.bubble.seed_level_pct, &ctl.heater, &ctl.flow)?;
        // Seeding moves nothing across the boundary; rebase on the new inventory
        self.energy.initial_content_btu += energy_content_btu(&self.mode) - content_before;
        self.relief_test_remaining_s = 0.0;
        if self.flow_override.take().is_some() {
            info!(time_s = self.time_s, "manual flow override released to the bubble sequence");
        }
        info!(
            time_s = self.time_s,
            pressure_psia = solid.pressure_psia,
            pzr_temp_f = solid.pzr_temp_f,
            "steam bubble seeded"
        );
        if let PlantMode::TwoPhase(plant) = &self.mode {
            self.sequence
                .enter(BubbleFormationPhase::Detection, &sequence_observation(plant));
        }
        info!(
            time_s = self.time_s,
            from = %BubbleFormationPhase::None,
            to = %BubbleFormationPhase::Detection,
            "bubble sequence phase"
        );
        Ok(())
    }

    fn record_solve(&mut self, outcome: &SolveOutcome) {
        let diag = &mut self.solver;
        if !outcome.converged {
            diag.nonconverged_count += 1;
            if diag.last_converged {
                warn!(
                    time_s = self.time_s,
                    iterations = outcome.iterations,
                    clamped = outcome.clamped,
                    last_update_psi = outcome.last_update_psi,
                    "coupled solve did not converge"
                );
            }
        }
        diag.last_iterations = outcome.iterations;
        diag.last_converged = outcome.converged;
        diag.last_clamped = outcome.clamped;
    }

    /// Pull inventory that the solve moved past the drift limit back onto
    /// the tick's starting mass and the vessel volume.
    fn saturate_drift(&mut self, plant: &mut TwoPhasePlant, mass_before: f64) -> bool {
        let mass_drift = (plant.system.total_mass() - mass_before).abs() / mass_before;
        let vessel = plant.system.pzr_volume_ft3;
        let volume_drift = (plant.system.pressurizer.total_volume() - vessel).abs() / vessel;
        if mass_drift <= SOLVER_DRIFT_LIMIT && volume_drift <= SOLVER_DRIFT_LIMIT {
            return false;
        }
        plant.system.loop_mass_lbm -= plant.system.total_mass() - mass_before;
        plant.system.pressurizer.fit_vessel(vessel);
        self.solver.drift_count += 1;
        warn!(
            time_s = self.time_s,
            mass_drift,
            volume_drift,
            "coupled solve drifted past its limit, inventory saturated"
        );
        true
    }

    fn tick_two_phase(
        &mut self,
        ctl: &Controllers,
        cfg: &PlantConfig,
        mut plant: TwoPhasePlant,
        dt: f64,
    ) -> SimResult<()> {
        let ht = &cfg.heat_transfer;
        let pumps = self.pumps_running;
        let p0 = plant.system.pressure_psia;
        let t_loop0 = plant.system.loop_temp_f;

        // Flows: the sequence first, then the operator, then automatic
        let obs = level_observation(&plant, pumps);
        let (flow_state, flows) = match self.sequence.sequence_flows(&cfg.bubble).or(self.flow_override) {
            Some(held) => ctl.flow.held(&obs, &held),
            None => ctl.flow.automatic(&plant.flow, &obs, dt),
        };
        if flow_state.path != plant.flow.path {
            if flow_state.path == LetdownPath::Isolated {
                warn!(time_s = self.time_s, level_pct = obs.level_pct, "letdown isolated on low level");
            } else {
                info!(time_s = self.time_s, path = %flow_state.path, "letdown path changed");
            }
        }
        plant.flow = flow_state;

        if pumps > 0 {
            plant.heater_setpoint_psia = heatup::pressure_setpoint_psia(
                &cfg.heatup,
                t_loop0,
                cfg.bubble.pressurize_setpoint_psia,
            );
        }
        let (heater_control, demand) =
            ctl.heater
                .update(&plant.heater_control, p0, plant.heater_setpoint_psia, dt);
        plant.heater_control = heater_control;
        plant.heater_demand = demand;

        // Residual heat removal runs only while letdown is cross-connected to it
        let source_kw = if pumps > 0 {
            cfg.rcp_heat_kw * f64::from(pumps)
        } else if plant.flow.path == LetdownPath::CrossConnect {
            cfg.rhr_pump_heat_kw
        } else {
            0.0
        };
        let q_source = kw_to_btu_per_s(source_kw);
        let q_loss = ht.loop_ambient_ua * (t_loop0 - cfg.ambient_temp_f);
        let q_dump = if pumps > 0 {
            let capacity = plant.system.loop_mass_lbm * specific_heat(t_loop0)
                + RCS_METAL_HEAT_CAPACITY_BTU_PER_F;
            heatup::steam_dump_btu_per_s(&cfg.heatup, t_loop0, q_source - q_loss, capacity)
        } else {
            0.0
        };
        let loop_temp_change = temperature_change_from_heat(
            (q_source - q_loss - q_dump) * dt,
            plant.system.loop_mass_lbm,
            t_loop0,
            RCS_METAL_HEAT_CAPACITY_BTU_PER_F,
        );

        let mass_before = plant.system.total_mass();
        let liquid_before = plant.system.pressurizer.liquid_mass_lbm;
        let input = SolveInput {
            loop_temp_change_f: loop_temp_change,
            pzr_liquid_temp_f: plant.pressurizer.liquid_temp_f,
            thermal_damping: if pumps > 0 { 1.0 } else { cfg.thermal_damping },
        };
        let mut outcome =
            solve_equilibrium(&mut plant.system, &input, &cfg.pressure_band, &cfg.solver);
        if self.saturate_drift(&mut plant, mass_before) {
            outcome.converged = false;
        }
        self.record_solve(&outcome);
        let vessel = plant.system.pzr_volume_ft3;
        let mut pzr_full = outcome.pressurizer_full;

        let p = plant.system.pressure_psia;
        let t_loop = plant.system.loop_temp_f;
        if outcome.surge_mass_lbm > 0.0 {
            let pzr = &mut plant.pressurizer;
            pzr.liquid_temp_f = mix(liquid_before, pzr.liquid_temp_f, outcome.surge_mass_lbm, t_loop);
        }

        let spray_gpm = spray_flow_gpm(p, plant.heater_setpoint_psia, pumps > 0);
        let inputs = PressurizerInputs {
            pressure_psia: p,
            pressure_rate_psi_per_s: (p - p0) / dt,
            heater_command_kw: demand * cfg.heater_capacity_kw,
            spray_gpm,
            spray_temp_f: t_loop,
            ambient_temp_f: cfg.ambient_temp_f,
            ambient_ua: ht.pzr_ambient_ua,
        };
        let heat = pressurizer::step(
            &mut plant.pressurizer,
            &mut plant.system.pressurizer,
            vessel,
            &inputs,
            dt,
        );

        // Net charging enters and letdown leaves through the pressurizer liquid
        let net_lbm = flows.net_to_rcs_lbm(dt);
        let inventory = &mut plant.system.pressurizer;
        if -net_lbm > inventory.liquid_mass_lbm {
            return Err(SimError::NonPhysical {
                what: "net letdown exceeds pressurizer liquid inventory",
            });
        }
        if net_lbm > 0.0 {
            plant.pressurizer.liquid_temp_f = mix(
                inventory.liquid_mass_lbm,
                plant.pressurizer.liquid_temp_f,
                net_lbm,
                t_loop,
            );
        }
        let rho_pzr = liquid_density(plant.pressurizer.liquid_temp_f, p);
        let refused = inventory.add_liquid(net_lbm, rho_pzr);
        if refused > 0.0 {
            // Charging that the full pressurizer refuses stays in the loop
            plant.system.loop_mass_lbm += refused;
            pzr_full = true;
        }
        if pzr_full && !self.pzr_full {
            warn!(time_s = self.time_s, level_pct = plant.level_pct(), "pressurizer full");
        }
        self.pzr_full = pzr_full;
        if self.sequence.phase == BubbleFormationPhase::Drain {
            self.sequence.record_drain(-net_lbm / rho_pzr, plant.level_pct());
        }

        let (tank, tank_flows) = ctl.tank.step(&self.tank, &flows, plant.system.total_mass(), dt);
        self.tank = tank;
        self.tank_flows = tank_flows;

        let advected_temp = if net_lbm > 0.0 {
            t_loop
        } else {
            plant.pressurizer.liquid_temp_f
        };
        self.energy.record(
            heat.heater_btu + q_source * dt,
            heat.ambient_loss_btu + (q_loss + q_dump) * dt,
            net_lbm * saturated_liquid_enthalpy(advected_temp),
        );
        self.flows = flows;
        self.spray_gpm = spray_gpm;
        self.steam_dump_kw = q_dump / BTU_PER_KW_S;

        self.sequence.phase_time_s += dt;
        let seq_obs = sequence_observation(&plant);
        if let Some(next) = self.sequence.next_phase(&seq_obs, &cfg.bubble) {
            self.enter_phase(next, &mut plant, &seq_obs, ctl, cfg);
        }

        if let PlantMode::TwoPhase(stored) = &mut self.mode {
            **stored = plant;
        }
        Ok(())
    }

    /// Move the sequence to `next` and run its entry action.
    fn enter_phase(
        &mut self,
        next: BubbleFormationPhase,
        plant: &mut TwoPhasePlant,
        obs: &SequenceObservation,
        ctl: &Controllers,
        cfg: &PlantConfig,
    ) {
        let from = self.sequence.phase;
        if from == BubbleFormationPhase::Verification && next == BubbleFormationPhase::Detection {
            warn!(
                time_s = self.time_s,
                pressure_psia = obs.pressure_psia,
                "no compressible steam cushion, repeating detection"
            );
        }
        self.sequence.enter(next, obs);
        match next {
            BubbleFormationPhase::Stabilize => {
                plant.flow = ctl
                    .flow
                    .handoff_state(&level_observation(plant, self.pumps_running));
            }
            BubbleFormationPhase::Pressurize => {
                plant.heater_setpoint_psia = cfg.bubble.pressurize_setpoint_psia;
            }
            _ => {}
        }
        info!(time_s = self.time_s, from = %from, to = %next, "bubble sequence phase");
    }

    fn refresh_alarms(&mut self) {
        let (solid, relief_open, level) = match &self.mode {
            PlantMode::Solid(s) => (true, s.relief_open, 100.0),
            PlantMode::TwoPhase(p) => (false, false, p.level_pct()),
        };
        let p = self.mode.pressure_psia();
        let t_loop = self.mode.loop_temp_f();
        self.alarms = Alarms::evaluate(&AlarmInputs {
            solid,
            pressure_psia: p,
            pumps_running: self.pumps_running,
            relief_open,
            pzr_level_pct: level,
            pzr_full: self.pzr_full,
            letdown_path: self.letdown_path(),
            tank_level_pct: self.tank.level_pct(),
            subcooling_f: saturation_temperature(p) - t_loop,
            heatup_rate_f_per_hr: self.heatup_rate_f_per_hr,
            solver_converged: self.solver.last_converged,
            conservation_fault: self.mass.fault,
        });
    }

    fn letdown_path(&self) -> LetdownPath {
        match &self.mode {
            PlantMode::Solid(s) => select_letdown_path(s.loop_temp_f, s.pressure_psia, 100.0),
            PlantMode::TwoPhase(p) => p.flow.path,
        }
    }
}

/// Fixed-step heatup simulation of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatupSim {
    scenario: Scenario,
    config: PlantConfig,
    controllers: Controllers,
    budget: TimeBudget,
    initial: SimState,
    state: SimState,
}

impl HeatupSim {
    pub fn new(scenario: Scenario, config: PlantConfig) -> SimResult<Self> {
        config.validate()?;
        let controllers = Controllers::new()?;
        let initial = SimState::initial(scenario, &config, &controllers)?;
        Ok(Self {
            scenario,
            budget: TimeBudget::new(config.time),
            config,
            controllers,
            state: initial.clone(),
            initial,
        })
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    pub fn time_s(&self) -> f64 {
        self.state.time_s
    }

    pub fn phase(&self) -> BubbleFormationPhase {
        self.state.sequence.phase
    }

    pub fn sequence(&self) -> &BubbleSequence {
        &self.state.sequence
    }

    pub fn mode(&self) -> &PlantMode {
        &self.state.mode
    }

    pub fn tank(&self) -> &TankState {
        &self.state.tank
    }

    pub fn mass_ledger(&self) -> &MassLedger {
        &self.state.mass
    }

    pub fn energy_ledger(&self) -> &EnergyLedger {
        &self.state.energy
    }

    pub fn alarms(&self) -> Alarms {
        self.state.alarms
    }

    pub fn pumps_running(&self) -> u8 {
        self.state.pumps_running
    }

    pub fn flow_override(&self) -> Option<FlowOverride> {
        self.state.flow_override
    }

    pub fn time_acceleration(&self) -> f64 {
        self.budget.multiplier
    }

    /// Advance one physics tick.
    ///
    /// A conservation fault is returned after the tick has been committed and
    /// the alarm latched. A solve that drifts past its limit is saturated
    /// back onto the vessel and counted as non-converged.
    pub fn step(&mut self) -> SimResult<()> {
        let dt = self.config.dt_s;
        let ctl = &self.controllers;
        let cfg = &self.config;
        let state = &mut self.state;
        let loop_before = state.mode.loop_temp_f();

        match &state.mode {
            PlantMode::Solid(solid) => {
                let solid = *solid;
                state.tick_solid(ctl, cfg, solid, dt)?;
            }
            PlantMode::TwoPhase(plant) => {
                let plant = **plant;
                state.tick_two_phase(ctl, cfg, plant, dt)?;
            }
        }

        state.time_s += dt;
        state.heatup_rate_f_per_hr = (state.mode.loop_temp_f() - loop_before) / dt * 3_600.0;
        let check = state.mass.check(
            state.mode.rcs_mass_lbm(),
            &state.tank.accumulator,
            cfg.mass_tolerance_lbm,
            state.time_s,
        );
        state.energy.update(energy_content_btu(&state.mode));
        state.refresh_alarms();
        check
    }

    /// Run `seconds` of simulated time.
    pub fn run_for(&mut self, seconds: f64) -> SimResult<()> {
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "run duration must be non-negative",
            });
        }
        let ticks = (seconds / self.config.dt_s + 1e-9).floor() as u64;
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Spend `wall_s` of host time at the current acceleration.
    pub fn run_frame(&mut self, wall_s: f64) -> SimResult<FrameReport> {
        let report = self.budget.begin_frame(wall_s, self.config.dt_s);
        for _ in 0..report.ticks {
            self.step()?;
        }
        Ok(report)
    }

    /// Restore the scenario's initial state. Time acceleration is kept.
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.budget.reset();
        info!(scenario = %self.scenario, "scenario reset");
    }

    /// Validate and apply an operator command.
    ///
    /// A rejected command leaves the plant exactly as it was.
    pub fn apply(&mut self, command: OperatorCommand) -> Result<(), CommandRejection> {
        let phase = self.state.sequence.phase;
        match command {
            OperatorCommand::SetTimeAcceleration { multiplier } => {
                let max = self.config.time.max_time_acceleration;
                if !(multiplier > 0.0 && multiplier <= max) {
                    return Err(CommandRejection::TimeAccelerationOutOfRange {
                        requested: multiplier,
                        max,
                    });
                }
                self.budget.multiplier = multiplier;
            }
            OperatorCommand::ManualFlowOverride(flows) => {
                if phase.flows_fixed_by_sequence() {
                    return Err(CommandRejection::FlowsOwnedBySequence { phase });
                }
                flows.validate()?;
                self.state.flow_override = Some(flows);
            }
            OperatorCommand::ClearFlowOverride => {
                if phase.flows_fixed_by_sequence() {
                    return Err(CommandRejection::FlowsOwnedBySequence { phase });
                }
                if self.state.flow_override.take().is_none() {
                    return Err(CommandRejection::NoOverrideActive);
                }
            }
            OperatorCommand::ReliefTest => {
                if !self.state.mode.is_solid() {
                    return Err(CommandRejection::ReliefTestRequiresSolidPlant);
                }
                if self.state.relief_test_remaining_s > 0.0 {
                    return Err(CommandRejection::ReliefTestInProgress);
                }
                self.state.relief_test_remaining_s = RELIEF_TEST_DURATION_S;
            }
            OperatorCommand::StartReactorCoolantPumps => {
                if !phase.allows_pump_start() {
                    return Err(CommandRejection::PumpStartNotPermitted { phase });
                }
                if self.state.pumps_running > 0 {
                    return Err(CommandRejection::PumpsAlreadyRunning);
                }
                let PlantMode::TwoPhase(plant) = &mut self.state.mode else {
                    return Err(CommandRejection::PumpStartNotPermitted { phase });
                };
                plant.flow = self.controllers.flow.preload_pump_start(&plant.flow, RCP_COUNT);
                self.state.pumps_running = RCP_COUNT;
                info!(
                    time_s = self.state.time_s,
                    pumps = RCP_COUNT,
                    pressure_psia = plant.system.pressure_psia,
                    "reactor coolant pumps started"
                );
            }
            OperatorCommand::Reset => {
                self.reset();
                return Ok(());
            }
        }
        info!(time_s = self.state.time_s, ?command, "operator command accepted");
        Ok(())
    }

    pub fn snapshot(&self) -> PlantSnapshot {
        let s = &self.state;
        let p = s.mode.pressure_psia();
        let t_loop = s.mode.loop_temp_f();
        let base = PlantSnapshot {
            time_s: s.time_s,
            phase: s.sequence.phase,
            phase_time_s: s.sequence.phase_time_s,
            solid: s.mode.is_solid(),
            pressure_psia: p,
            loop_temp_f: t_loop,
            pzr_liquid_temp_f: 0.0,
            pzr_vapor_temp_f: 0.0,
            pzr_wall_temp_f: 0.0,
            subcooling_f: saturation_temperature(p) - t_loop,
            heatup_rate_f_per_hr: s.heatup_rate_f_per_hr,
            pzr_level_pct: 100.0,
            pzr_liquid_volume_ft3: PZR_VOLUME_FT3,
            pzr_vapor_volume_ft3: 0.0,
            pzr_liquid_mass_lbm: 0.0,
            pzr_vapor_mass_lbm: 0.0,
            loop_mass_lbm: 0.0,
            rcs_mass_lbm: s.mode.rcs_mass_lbm(),
            charging_gpm: s.flows.charging_gpm,
            letdown_gpm: s.flows.letdown_gpm,
            seal_injection_gpm: s.flows.seal_injection_gpm,
            seal_return_gpm: s.flows.seal_return_gpm,
            relief_gpm: 0.0,
            spray_gpm: s.spray_gpm,
            letdown_path: s.letdown_path(),
            flow_override: s.flow_override.is_some(),
            divert_gpm: s.tank_flows.divert_gpm,
            makeup_gpm: s.tank_flows.makeup_gpm,
            tank_level_pct: s.tank.level_pct(),
            tank_boron_ppm: s.tank.boron_ppm(),
            rcs_boron_ppm: s.tank.rcs_boron_ppm,
            heater_demand: 0.0,
            heater_effective_kw: 0.0,
            heater_setpoint_psia: 0.0,
            steam_dump_kw: s.steam_dump_kw,
            phase_change: PhaseChangeRates::default(),
            pumps_running: s.pumps_running,
            solver: s.solver,
            alarms: s.alarms,
            mass_error_lbm: s.mass.error_lbm,
            energy_imbalance_btu: s.energy.imbalance_btu,
            time_acceleration: self.budget.multiplier,
        };
        match &s.mode {
            PlantMode::Solid(solid) => {
                let pzr_mass = solid.pzr_mass_lbm();
                PlantSnapshot {
                    pzr_liquid_temp_f: solid.pzr_temp_f,
                    pzr_vapor_temp_f: solid.pzr_temp_f,
                    pzr_wall_temp_f: solid.pzr_temp_f,
                    pzr_liquid_mass_lbm: pzr_mass,
                    loop_mass_lbm: solid.total_mass_lbm - pzr_mass,
                    relief_gpm: solid.relief_gpm,
                    heater_demand: self.config.solid_heater_demand,
                    heater_effective_kw: solid.heater.value,
                    heater_setpoint_psia: self.controllers.solid.setpoint_psia,
                    ..base
                }
            }
            PlantMode::TwoPhase(plant) => {
                let inv = &plant.system.pressurizer;
                PlantSnapshot {
                    pzr_liquid_temp_f: plant.pressurizer.liquid_temp_f,
                    pzr_vapor_temp_f: plant.pressurizer.vapor_temp_f,
                    pzr_wall_temp_f: plant.pressurizer.wall_temp_f,
                    pzr_level_pct: plant.level_pct(),
                    pzr_liquid_volume_ft3: inv.liquid_volume_ft3,
                    pzr_vapor_volume_ft3: inv.vapor_volume_ft3,
                    pzr_liquid_mass_lbm: inv.liquid_mass_lbm,
                    pzr_vapor_mass_lbm: inv.vapor_mass_lbm,
                    loop_mass_lbm: plant.system.loop_mass_lbm,
                    heater_demand: plant.heater_demand,
                    heater_effective_kw: plant.pressurizer.heater.value,
                    heater_setpoint_psia: plant.heater_setpoint_psia,
                    phase_change: plant.pressurizer.rates,
                    ..base
                }
            }
        }
    }
}
