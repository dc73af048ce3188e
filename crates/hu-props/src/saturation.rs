//! Saturation-line properties of water.
//!
//! Pressure and temperature use the IAPWS-IF97 region 4 equations. Saturated
//! densities and enthalpies use the IAPWS supplementary release on
//! saturation properties of ordinary water substance.

use hu_core::precondition;
use hu_core::units::{
    degf_to_kelvin, kelvin_to_degf, kg_m3_to_lbm_ft3, kj_kg_to_btu_lbm, mpa_to_psia, psia_to_mpa,
};

pub const MIN_TEMPERATURE_F: f64 = 32.02;
pub const MAX_TEMPERATURE_F: f64 = 700.0;
pub const MIN_PRESSURE_PSIA: f64 = 0.09;
pub const MAX_PRESSURE_PSIA: f64 = 3_090.0;

/// Pressure step for numerical slopes along the saturation line (psi).
const SLOPE_STEP_PSI: f64 = 0.5;

pub(crate) mod si {
    pub const CRITICAL_TEMPERATURE_K: f64 = 647.096;
    pub const CRITICAL_PRESSURE_MPA: f64 = 22.064;
    pub const CRITICAL_DENSITY_KG_M3: f64 = 322.0;

    const N: [f64; 10] = [
        0.116_705_214_527_67e4,
        -0.724_213_167_032_06e6,
        -0.170_738_469_400_92e2,
        0.120_208_247_024_70e5,
        -0.323_255_503_223_33e7,
        0.149_151_086_135_30e2,
        -0.482_326_573_615_91e4,
        0.405_113_405_420_57e6,
        -0.238_555_575_678_49,
        0.650_175_348_447_98e3,
    ];

    /// IF97 eq. 30.
    pub fn saturation_pressure_mpa(t_k: f64) -> f64 {
        let theta = t_k + N[8] / (t_k - N[9]);
        let a = theta * theta + N[0] * theta + N[1];
        let b = N[2] * theta * theta + N[3] * theta + N[4];
        let c = N[5] * theta * theta + N[6] * theta + N[7];
        (2.0 * c / (-b + (b * b - 4.0 * a * c).sqrt())).powi(4)
    }

    /// IF97 eq. 31.
    pub fn saturation_temperature_k(p_mpa: f64) -> f64 {
        let beta = p_mpa.powf(0.25);
        let e = beta * beta + N[2] * beta + N[5];
        let f = N[0] * beta * beta + N[3] * beta + N[6];
        let g = N[1] * beta * beta + N[4] * beta + N[7];
        let d = 2.0 * g / (-f - (f * f - 4.0 * e * g).sqrt());
        (N[9] + d - ((N[9] + d).powi(2) - 4.0 * (N[8] + N[9] * d)).sqrt()) / 2.0
    }

    fn tau(t_k: f64) -> f64 {
        1.0 - t_k / CRITICAL_TEMPERATURE_K
    }

    pub fn liquid_density(t_k: f64) -> f64 {
        const B: [f64; 6] = [
            1.992_740_64,
            1.099_653_42,
            -0.510_839_303,
            -1.754_934_79,
            -45.517_035_2,
            -6.746_944_50e5,
        ];
        let t = tau(t_k);
        CRITICAL_DENSITY_KG_M3
            * (1.0
                + B[0] * t.powf(1.0 / 3.0)
                + B[1] * t.powf(2.0 / 3.0)
                + B[2] * t.powf(5.0 / 3.0)
                + B[3] * t.powf(16.0 / 3.0)
                + B[4] * t.powf(43.0 / 3.0)
                + B[5] * t.powf(110.0 / 3.0))
    }

    pub fn vapor_density(t_k: f64) -> f64 {
        const C: [f64; 6] = [
            -2.031_502_40,
            -2.683_029_40,
            -5.386_264_92,
            -17.299_160_5,
            -44.758_658_1,
            -63.920_106_3,
        ];
        let t = tau(t_k);
        CRITICAL_DENSITY_KG_M3
            * (C[0] * t.powf(2.0 / 6.0)
                + C[1] * t.powf(4.0 / 6.0)
                + C[2] * t.powf(8.0 / 6.0)
                + C[3] * t.powf(18.0 / 6.0)
                + C[4] * t.powf(37.0 / 6.0)
                + C[5] * t.powf(71.0 / 6.0))
            .exp()
    }

    /// Slope of the auxiliary vapor-pressure equation (MPa/K).
    fn vapor_pressure_slope(t_k: f64) -> f64 {
        const A: [f64; 6] = [
            -7.859_517_83,
            1.844_082_59,
            -11.786_649_7,
            22.680_741_1,
            -15.961_871_9,
            1.801_225_02,
        ];
        let t = tau(t_k);
        let ln_ratio = CRITICAL_TEMPERATURE_K / t_k
            * (A[0] * t
                + A[1] * t.powf(1.5)
                + A[2] * t.powi(3)
                + A[3] * t.powf(3.5)
                + A[4] * t.powi(4)
                + A[5] * t.powf(7.5));
        let p = CRITICAL_PRESSURE_MPA * ln_ratio.exp();
        -p / t_k
            * (ln_ratio
                + A[0]
                + 1.5 * A[1] * t.sqrt()
                + 3.0 * A[2] * t.powi(2)
                + 3.5 * A[3] * t.powf(2.5)
                + 4.0 * A[4] * t.powi(3)
                + 7.5 * A[5] * t.powf(6.5))
    }

    /// Auxiliary quantity α (J/kg).
    fn alpha(t_k: f64) -> f64 {
        const D: [f64; 5] = [
            -5.651_349_98e-8,
            2_690.666_31,
            127.287_297,
            -135.003_439,
            0.981_825_814,
        ];
        let th = t_k / CRITICAL_TEMPERATURE_K;
        1_000.0
            * (-1_135.905_627_715
                + D[0] * th.powi(-19)
                + D[1] * th
                + D[2] * th.powf(4.5)
                + D[3] * th.powi(5)
                + D[4] * th.powf(54.5))
    }

    /// Saturated liquid enthalpy (J/kg).
    pub fn liquid_enthalpy(t_k: f64) -> f64 {
        alpha(t_k) + t_k / liquid_density(t_k) * vapor_pressure_slope(t_k) * 1.0e6
    }

    /// Saturated vapor enthalpy (J/kg).
    pub fn vapor_enthalpy(t_k: f64) -> f64 {
        alpha(t_k) + t_k / vapor_density(t_k) * vapor_pressure_slope(t_k) * 1.0e6
    }
}

fn clamp_temperature(t_f: f64) -> f64 {
    precondition(t_f, MIN_TEMPERATURE_F, MAX_TEMPERATURE_F, "saturation temperature (°F)")
}

fn clamp_pressure(p_psia: f64) -> f64 {
    precondition(p_psia, MIN_PRESSURE_PSIA, MAX_PRESSURE_PSIA, "saturation pressure (psia)")
}

/// Saturation pressure (psia) at temperature `t_f` (°F).
pub fn saturation_pressure(t_f: f64) -> f64 {
    let t_k = degf_to_kelvin(clamp_temperature(t_f));
    mpa_to_psia(si::saturation_pressure_mpa(t_k))
}

/// Saturation temperature (°F) at pressure `p_psia`.
pub fn saturation_temperature(p_psia: f64) -> f64 {
    let p_mpa = psia_to_mpa(clamp_pressure(p_psia));
    kelvin_to_degf(si::saturation_temperature_k(p_mpa))
}

/// Saturated liquid density (lbm/ft³).
pub fn saturated_liquid_density(t_f: f64) -> f64 {
    kg_m3_to_lbm_ft3(si::liquid_density(degf_to_kelvin(clamp_temperature(t_f))))
}

/// Saturated vapor density (lbm/ft³).
pub fn saturated_vapor_density(t_f: f64) -> f64 {
    kg_m3_to_lbm_ft3(si::vapor_density(degf_to_kelvin(clamp_temperature(t_f))))
}

/// Saturated liquid enthalpy (BTU/lbm), zero at the triple point.
pub fn saturated_liquid_enthalpy(t_f: f64) -> f64 {
    kj_kg_to_btu_lbm(si::liquid_enthalpy(degf_to_kelvin(clamp_temperature(t_f))) / 1_000.0)
}

/// Saturated vapor enthalpy (BTU/lbm).
pub fn saturated_vapor_enthalpy(t_f: f64) -> f64 {
    kj_kg_to_btu_lbm(si::vapor_enthalpy(degf_to_kelvin(clamp_temperature(t_f))) / 1_000.0)
}

/// Latent heat of vaporization h_fg (BTU/lbm).
pub fn latent_heat(t_f: f64) -> f64 {
    saturated_vapor_enthalpy(t_f) - saturated_liquid_enthalpy(t_f)
}

/// Density of saturated steam at pressure `p_psia` (lbm/ft³).
pub fn vapor_density_at_pressure(p_psia: f64) -> f64 {
    saturated_vapor_density(saturation_temperature(p_psia))
}

/// dρ_g/dP along the saturation line (lbm/ft³ per psi).
pub fn vapor_density_slope(p_psia: f64) -> f64 {
    let p = clamp_pressure(p_psia);
    let lo = (p - SLOPE_STEP_PSI).max(MIN_PRESSURE_PSIA);
    let hi = (p + SLOPE_STEP_PSI).min(MAX_PRESSURE_PSIA);
    (vapor_density_at_pressure(hi) - vapor_density_at_pressure(lo)) / (hi - lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atmospheric_boiling_point() {
        assert!((saturation_temperature(14.696) - 212.0).abs() < 0.1);
    }

    #[test]
    fn steam_table_spot_checks() {
        // ~1000 psia at 544.6 °F
        assert!((saturation_pressure(544.6) - 1_000.0).abs() < 1.5);
        // 2250 psia, normal operating pressure
        assert!((saturation_temperature(2_250.0) - 652.7).abs() < 0.5);
        assert!((saturation_temperature(400.0) - 444.6).abs() < 0.2);
        assert!((saturated_liquid_density(100.0) - 61.99).abs() < 0.02);
        assert!((saturated_liquid_enthalpy(212.0) - 180.2).abs() < 0.3);
        assert!((latent_heat(212.0) - 970.1).abs() < 0.5);
        assert!((saturated_vapor_density(444.6) - 0.861).abs() < 0.005);
    }

    #[test]
    fn vapor_density_rises_with_pressure() {
        let mut last = 0.0;
        for p in [20.0, 100.0, 400.0, 1_000.0, 2_250.0] {
            let rho = vapor_density_at_pressure(p);
            assert!(rho > last);
            assert!(vapor_density_slope(p) > 0.0);
            last = rho;
        }
    }

    #[test]
    fn slope_matches_secant_at_one_thousand_psia() {
        let secant = (vapor_density_at_pressure(1_010.0) - vapor_density_at_pressure(990.0)) / 20.0;
        let slope = vapor_density_slope(1_000.0);
        assert!((slope - secant).abs() / secant < 1e-3);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn saturation_round_trip(t in 40.0f64..690.0) {
            let back = saturation_temperature(saturation_pressure(t));
            prop_assert!((back - t).abs() < 1e-6);
        }

        #[test]
        fn latent_heat_positive_and_decreasing(t in 40.0f64..680.0) {
            prop_assert!(latent_heat(t) > 0.0);
            prop_assert!(latent_heat(t + 5.0) < latent_heat(t));
        }
    }
}
