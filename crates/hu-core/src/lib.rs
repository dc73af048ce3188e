//! hu-core: shared foundation for the heatup engine.
//!
//! Contains:
//! - constants (reference plant geometry, physical constants, interlock setpoints)
//! - units (uom conversions between the plant's English units and SI)
//! - numeric (Real + finite checks + interpolation + precondition clamping)
//! - error (shared error types)

pub mod constants;
pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
