//! Liquid transport properties.
//!
//! Returned in SI (Pa·s, W/(m·K)); only the film condensation correlation
//! consumes them and it is evaluated in SI.

use crate::saturation::{MAX_TEMPERATURE_F, MIN_TEMPERATURE_F};
use hu_core::units::degf_to_kelvin;
use hu_core::{interpolate, precondition};

/// (K, W/(m·K)) along the saturated liquid line.
const CONDUCTIVITY_TABLE: [(f64, f64); 8] = [
    (273.15, 0.561),
    (323.15, 0.643),
    (373.15, 0.679),
    (423.15, 0.682),
    (473.15, 0.665),
    (523.15, 0.618),
    (573.15, 0.545),
    (623.15, 0.450),
];

pub(crate) fn viscosity_si(t_k: f64) -> f64 {
    2.414e-5 * 10f64.powf(247.8 / (t_k - 140.0))
}

pub(crate) fn conductivity_si(t_k: f64) -> f64 {
    interpolate(&CONDUCTIVITY_TABLE, t_k)
}

/// Dynamic viscosity of liquid water (Pa·s), Vogel form.
pub fn liquid_viscosity(t_f: f64) -> f64 {
    let t = precondition(t_f, MIN_TEMPERATURE_F, MAX_TEMPERATURE_F, "viscosity temperature (°F)");
    viscosity_si(degf_to_kelvin(t))
}

/// Thermal conductivity of liquid water (W/(m·K)).
pub fn liquid_thermal_conductivity(t_f: f64) -> f64 {
    let t = precondition(t_f, MIN_TEMPERATURE_F, MAX_TEMPERATURE_F, "conductivity temperature (°F)");
    conductivity_si(degf_to_kelvin(t))
}
