// hu-core/src/units.rs
//
// The plant is described in English engineering units. Property correlations
// are evaluated in SI, so every crossing goes through the conversions below.

use uom::si::f64::{
    Length as UomLength, MassDensity as UomMassDensity, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

type Length = UomLength;
type Density = UomMassDensity;
type Pressure = UomPressure;
type Temperature = UomThermodynamicTemperature;

/// kJ/kg per BTU/lbm.
pub const KJ_PER_KG_PER_BTU_PER_LBM: f64 = 2.326;
/// BTU delivered by one kW over one second.
pub const BTU_PER_KW_S: f64 = 0.947_817_1;
/// US gallon in cubic feet.
pub const FT3_PER_GALLON: f64 = 0.133_680_6;
/// gpm to ft³/s.
pub const GPM_TO_FT3_PER_S: f64 = FT3_PER_GALLON / 60.0;
/// W/(m²·K) to BTU/(s·ft²·°F).
pub const W_PER_M2K_TO_BTU_PER_S_FT2_F: f64 = 4.892_2e-5;

#[inline]
fn psia(v: f64) -> Pressure {
    use uom::si::pressure::pound_force_per_square_inch;
    Pressure::new::<pound_force_per_square_inch>(v)
}

#[inline]
fn degf(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    Temperature::new::<degree_fahrenheit>(v)
}

#[inline]
fn ft(v: f64) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn psia_to_mpa(p_psia: f64) -> f64 {
    use uom::si::pressure::megapascal;
    psia(p_psia).get::<megapascal>()
}

#[inline]
pub fn mpa_to_psia(p_mpa: f64) -> f64 {
    use uom::si::pressure::{megapascal, pound_force_per_square_inch};
    Pressure::new::<megapascal>(p_mpa).get::<pound_force_per_square_inch>()
}

#[inline]
pub fn degf_to_kelvin(t_f: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    degf(t_f).get::<kelvin>()
}

#[inline]
pub fn kelvin_to_degf(t_k: f64) -> f64 {
    use uom::si::thermodynamic_temperature::{degree_fahrenheit, kelvin};
    Temperature::new::<kelvin>(t_k).get::<degree_fahrenheit>()
}

#[inline]
pub fn kg_m3_to_lbm_ft3(rho: f64) -> f64 {
    use uom::si::mass_density::pound_per_cubic_foot;
    kg_per_m3(rho).get::<pound_per_cubic_foot>()
}

#[inline]
pub fn ft_to_m(l_ft: f64) -> f64 {
    use uom::si::length::meter;
    ft(l_ft).get::<meter>()
}

#[inline]
pub fn kj_kg_to_btu_lbm(h: f64) -> f64 {
    h / KJ_PER_KG_PER_BTU_PER_LBM
}

#[inline]
pub fn kw_to_btu_per_s(q_kw: f64) -> f64 {
    q_kw * BTU_PER_KW_S
}

/// Temperature difference in °F to the same difference in K.
#[inline]
pub fn delta_degf_to_kelvin(dt_f: f64) -> f64 {
    dt_f * 5.0 / 9.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_match_reference_values() {
        assert!((psia_to_mpa(14.695_95) - 0.101_325).abs() < 1e-6);
        assert!((mpa_to_psia(1.0) - 145.037_7).abs() < 1e-3);
        assert!((degf_to_kelvin(212.0) - 373.15).abs() < 1e-9);
        assert!((kelvin_to_degf(273.15) - 32.0).abs() < 1e-9);
        assert!((kg_m3_to_lbm_ft3(1000.0) - 62.428).abs() < 1e-2);
        assert!((ft_to_m(1.0) - 0.3048).abs() < 1e-12);
        assert!((kj_kg_to_btu_lbm(2326.0) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn temperature_round_trip() {
        for t in [40.0, 212.0, 557.0, 650.0] {
            assert!((kelvin_to_degf(degf_to_kelvin(t)) - t).abs() < 1e-9);
        }
    }
}
