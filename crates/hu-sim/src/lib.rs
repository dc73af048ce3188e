//! Heatup scenario engine: cold shutdown to hot standby.
//!
//! Provides:
//! - Pressurizer phase-change model (flash, heater, spray, wall, rainout)
//! - Water-solid pressure control with relief hysteresis
//! - Two-phase level control and letdown routing
//! - Volume control tank with divert, makeup and boron tracking
//! - Bubble-formation sequence and the fixed-step orchestrator
//! - Pump heatup to hot standby: pressure program and steam dumps
//! - Mass and energy ledgers, alarms, operator commands and the host time budget

pub mod alarms;
pub mod bubble;
pub mod command;
pub mod config;
pub mod error;
pub mod flow_control;
pub mod flows;
pub mod heatup;
pub mod host;
pub mod ledger;
pub mod plant;
pub mod pressurizer;
pub mod run;
pub mod scenario;
pub mod sim;
pub mod snapshot;
pub mod solid_plant;
pub mod tank;

// Re-exports for public API
pub use alarms::Alarms;
pub use bubble::{BubbleFormationPhase, BubbleSequence};
pub use command::{CommandRejection, FlowOverride, OperatorCommand};
pub use config::{
    BubbleSequenceConfig, HeatTransferConfig, HeatupProgramConfig, PlantConfig, TimeBudgetConfig,
};
pub use error::{SimError, SimResult};
pub use flow_control::LetdownPath;
pub use flows::CvcsFlows;
pub use host::{FrameReport, TimeBudget};
pub use plant::{PlantMode, TwoPhasePlant};
pub use run::{RunOptions, SimRecord, run, run_scenario};
pub use scenario::Scenario;
pub use sim::HeatupSim;
pub use snapshot::{PlantSnapshot, SolverDiagnostics};
