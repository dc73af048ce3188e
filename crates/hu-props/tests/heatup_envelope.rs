//! Integration test: property consistency across the heatup envelope.
//!
//! Cold shutdown (150 °F, 350 psia) to hot standby (557 °F, 2235 psia).

use hu_props::{
    compressibility, expansion_coefficient, latent_heat, liquid_density, saturated_liquid_density,
    saturation_pressure, saturation_temperature, specific_heat, vapor_density_at_pressure,
    vapor_density_slope,
};
use proptest::prelude::*;

#[test]
fn subcooled_liquid_is_denser_than_saturated() {
    for (t, p) in [(150.0, 350.0), (300.0, 400.0), (450.0, 1_000.0), (557.0, 2_235.0)] {
        assert!(p > saturation_pressure(t));
        assert!(liquid_density(t, p) > saturated_liquid_density(t));
    }
}

#[test]
fn hot_standby_properties() {
    let t = 557.0;
    let p = 2_235.0;
    assert!((liquid_density(t, p) - 46.3).abs() < 0.3);
    assert!(expansion_coefficient(t, p) > 1.4e-3);
    assert!(compressibility(t) > 1.2e-5);
    assert!(specific_heat(t) > 1.2);
    let h_fg = latent_heat(saturation_temperature(p));
    assert!((410.0..430.0).contains(&h_fg));
}

proptest! {
    #[test]
    fn vapor_slope_is_consistent_with_finite_change(p in 20.0f64..2_400.0) {
        let dp = 5.0;
        let predicted = vapor_density_at_pressure(p) + vapor_density_slope(p) * dp;
        let actual = vapor_density_at_pressure(p + dp);
        prop_assert!((predicted - actual).abs() / actual < 2e-3);
    }

    #[test]
    fn expansion_is_positive_above_freezing_region(t in 60.0f64..640.0) {
        let p = saturation_pressure(t).max(14.7) + 100.0;
        prop_assert!(expansion_coefficient(t, p) > 0.0);
    }
}
