//! Compressed (subcooled) liquid water.

use crate::error::{PropsError, PropsResult};
use crate::saturation::{
    MAX_PRESSURE_PSIA, MAX_TEMPERATURE_F, MIN_PRESSURE_PSIA, MIN_TEMPERATURE_F,
    saturated_liquid_density, saturation_pressure,
};
use hu_core::interpolate;

/// GPa per psi.
const GPA_PER_PSI: f64 = 6.894_757e-6;

/// Isothermal compressibility of liquid water, (°F, 1/GPa).
///
/// Fitted to steam-table data along the saturation line. The steep rise
/// above 550 °F is what makes hot solid-plant pressure so sensitive.
const COMPRESSIBILITY_TABLE: [(f64, f64); 15] = [
    (50.0, 0.478),
    (77.0, 0.452_5),
    (122.0, 0.441_7),
    (167.0, 0.455),
    (212.0, 0.489_5),
    (257.0, 0.543),
    (302.0, 0.613_5),
    (347.0, 0.711),
    (392.0, 0.849),
    (437.0, 1.04),
    (482.0, 1.322),
    (527.0, 1.77),
    (572.0, 2.49),
    (617.0, 4.0),
    (662.0, 8.0),
];

/// Isothermal compressibility κ (1/psi) of liquid at `t_f` (°F).
pub fn compressibility(t_f: f64) -> f64 {
    interpolate(&COMPRESSIBILITY_TABLE, t_f) * GPA_PER_PSI
}

/// Liquid density (lbm/ft³) at `t_f` (°F) and `p_psia`.
///
/// Saturated density corrected for compression above the local saturation
/// pressure: ρ = ρ_f(T)·(1 + κ(T)·(P − Psat(T))).
pub fn liquid_density(t_f: f64, p_psia: f64) -> f64 {
    let rho_f = saturated_liquid_density(t_f);
    rho_f * (1.0 + compressibility(t_f) * (p_psia - saturation_pressure(t_f)))
}

/// Checks a liquid state against the correlation envelope.
///
/// Scenario setup and operator input go through this instead of the
/// precondition clamps in the property functions.
pub fn validate_liquid_state(t_f: f64, p_psia: f64) -> PropsResult<()> {
    if !t_f.is_finite() {
        return Err(PropsError::NonPhysical { what: "temperature" });
    }
    if !p_psia.is_finite() {
        return Err(PropsError::NonPhysical { what: "pressure" });
    }
    if !(MIN_TEMPERATURE_F..=MAX_TEMPERATURE_F).contains(&t_f) {
        return Err(PropsError::OutOfRange {
            what: "temperature (°F)",
            value: t_f,
            min: MIN_TEMPERATURE_F,
            max: MAX_TEMPERATURE_F,
        });
    }
    if !(MIN_PRESSURE_PSIA..=MAX_PRESSURE_PSIA).contains(&p_psia) {
        return Err(PropsError::OutOfRange {
            what: "pressure (psia)",
            value: p_psia,
            min: MIN_PRESSURE_PSIA,
            max: MAX_PRESSURE_PSIA,
        });
    }
    Ok(())
}
