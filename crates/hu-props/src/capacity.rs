//! Expansion and heat-capacity calculations built on the property library.

use crate::liquid::{compressibility as liquid_compressibility, liquid_density};
use crate::saturation::{MAX_TEMPERATURE_F, MIN_TEMPERATURE_F, saturated_liquid_enthalpy, si};
use crate::transport::{conductivity_si, viscosity_si};
use hu_core::constants::physics::STANDARD_GRAVITY_M_S2;
use hu_core::units::{
    W_PER_M2K_TO_BTU_PER_S_FT2_F, degf_to_kelvin, delta_degf_to_kelvin, ft_to_m,
};

/// Temperature step for numerical derivatives (°F).
const DERIVATIVE_STEP_F: f64 = 0.5;

/// Wall subcooling below which the film correlation is held constant (°F).
const MIN_FILM_SUBCOOLING_F: f64 = 0.1;

fn bracket(t_f: f64) -> (f64, f64) {
    let lo = (t_f - DERIVATIVE_STEP_F).max(MIN_TEMPERATURE_F);
    let hi = (t_f + DERIVATIVE_STEP_F).min(MAX_TEMPERATURE_F);
    (lo, hi)
}

/// Volumetric thermal expansion coefficient β (1/°F) of liquid at fixed pressure.
pub fn expansion_coefficient(t_f: f64, p_psia: f64) -> f64 {
    let (lo, hi) = bracket(t_f);
    -(liquid_density(hi, p_psia) - liquid_density(lo, p_psia))
        / ((hi - lo) * liquid_density(t_f, p_psia))
}

/// Isothermal compressibility κ (1/psi).
pub fn compressibility(t_f: f64) -> f64 {
    liquid_compressibility(t_f)
}

/// Specific heat of liquid water (BTU/(lbm·°F)), from the slope of h_f.
pub fn specific_heat(t_f: f64) -> f64 {
    let (lo, hi) = bracket(t_f);
    (saturated_liquid_enthalpy(hi) - saturated_liquid_enthalpy(lo)) / (hi - lo)
}

/// Volume change per unit pressure (ft³/psi) of liquid regions given as
/// `(volume_ft3, temperature_f)` pairs.
pub fn system_compliance(regions: &[(f64, f64)]) -> f64 {
    regions
        .iter()
        .map(|&(volume, t_f)| volume * compressibility(t_f))
        .sum()
}

/// Temperature change (°F) of `mass_lbm` of water plus attached metal of
/// `metal_capacity_btu_per_f` receiving `heat_btu`.
pub fn temperature_change_from_heat(
    heat_btu: f64,
    mass_lbm: f64,
    t_f: f64,
    metal_capacity_btu_per_f: f64,
) -> f64 {
    let capacity = mass_lbm.max(0.0) * specific_heat(t_f) + metal_capacity_btu_per_f.max(0.0);
    if capacity <= 0.0 {
        return 0.0;
    }
    heat_btu / capacity
}

/// Laminar film condensation coefficient on a vertical wall (Nusselt),
/// in BTU/(s·ft²·°F).
///
/// `t_sat_f` is the steam saturation temperature, `wall_subcooling_f` is
/// Tsat − T_wall and `height_ft` is the condensing length.
pub fn film_condensation_coefficient(t_sat_f: f64, wall_subcooling_f: f64, height_ft: f64) -> f64 {
    let t_k = degf_to_kelvin(t_sat_f.clamp(MIN_TEMPERATURE_F, MAX_TEMPERATURE_F));
    let rho_l = si::liquid_density(t_k);
    let rho_v = si::vapor_density(t_k);
    let h_fg = si::vapor_enthalpy(t_k) - si::liquid_enthalpy(t_k);
    let k = conductivity_si(t_k);
    let mu = viscosity_si(t_k);
    let length = ft_to_m(height_ft.max(f64::EPSILON));
    let subcooling = delta_degf_to_kelvin(wall_subcooling_f.max(MIN_FILM_SUBCOOLING_F));

    let h_si = 0.943
        * (rho_l * (rho_l - rho_v) * STANDARD_GRAVITY_M_S2 * h_fg * k.powi(3)
            / (mu * length * subcooling))
            .powf(0.25);
    h_si * W_PER_M2K_TO_BTU_PER_S_FT2_F
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_grows_with_temperature() {
        let b_cold = expansion_coefficient(100.0, 350.0);
        let b_hot = expansion_coefficient(500.0, 1_000.0);
        assert!((b_cold - 2.05e-4).abs() < 0.1e-4);
        assert!((b_hot - 1.15e-3).abs() < 0.05e-3);
    }

    #[test]
    fn specific_heat_reference_points() {
        assert!((specific_heat(100.0) - 0.998).abs() < 0.005);
        assert!((specific_heat(500.0) - 1.187).abs() < 0.01);
    }

    #[test]
    fn compliance_sums_regions() {
        let c = system_compliance(&[(1_800.0, 200.0), (11_500.0, 200.0)]);
        assert!((c - 13_300.0 * compressibility(200.0)).abs() < 1e-12);
    }

    #[test]
    fn heat_with_no_capacity_changes_nothing() {
        assert_eq!(temperature_change_from_heat(100.0, 0.0, 200.0, 0.0), 0.0);
        let dt = temperature_change_from_heat(1_000.0, 1_000.0, 100.0, 0.0);
        assert!((dt - 1_000.0 / (1_000.0 * specific_heat(100.0))).abs() < 1e-12);
    }

    #[test]
    fn film_coefficient_magnitude() {
        // Pressurizer wall at 400 psia, 10 °F subcooled: ~0.19 BTU/(s·ft²·°F)
        let h = film_condensation_coefficient(444.6, 10.0, 52.75);
        assert!((h - 0.192).abs() < 0.01);
        // Thinner film at small subcooling gives a higher coefficient
        assert!(film_condensation_coefficient(444.6, 1.0, 52.75) > h);
    }
}
