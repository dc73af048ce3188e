//! Coupled pressure-temperature-volume equilibrium solver.
//!
//! Primary entry point: [`solve_equilibrium`].
//!
//! The reactor coolant loop is a rigid volume of compressible liquid joined
//! to the pressurizer by the surge line. Heating the loop expands its water;
//! whatever does not fit by compressing the loop surges into the pressurizer
//! and compresses the steam cushion. The solver finds the pressure at which
//! the loop's compressed volume, the pressurizer liquid volume and the steam
//! density at saturation all agree.

pub mod config;
pub mod coupled;
pub mod error;
pub mod state;

pub use config::{PressureBand, SolverConfig};
pub use coupled::{SolveInput, SolveOutcome, solve_equilibrium};
pub use error::{SolverError, SolverResult};
pub use state::{PressurizerInventory, SystemState};
