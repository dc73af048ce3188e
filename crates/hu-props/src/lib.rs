//! hu-props: water property and capacity library for the heatup engine.
//!
//! Provides:
//! - Saturation line (IAPWS-IF97 region 4 plus the IAPWS auxiliary equations
//!   for saturated densities and enthalpies)
//! - Subcooled liquid density with tabulated isothermal compressibility
//! - Liquid transport properties (viscosity, thermal conductivity)
//! - Expansion/capacity calculations built on the above (β, κ, cp, system
//!   compliance, film condensation coefficient)
//!
//! All functions are stateless. Public signatures use the plant's English
//! units: °F, psia, lbm/ft³, BTU/lbm. Correlations run in SI internally.
//!
//! Inputs outside the valid envelope (32–700 °F, 0.09–3090 psia) are
//! precondition violations: they panic in debug builds and are clamped in
//! release builds. Use [`validate_liquid_state`] where a recoverable check
//! is wanted instead.

pub mod capacity;
pub mod error;
pub mod liquid;
pub mod saturation;
pub mod transport;

pub use capacity::{
    expansion_coefficient, film_condensation_coefficient, specific_heat, system_compliance,
    temperature_change_from_heat,
};
pub use error::{PropsError, PropsResult};
pub use liquid::{compressibility, liquid_density, validate_liquid_state};
pub use saturation::{
    latent_heat, saturated_liquid_density, saturated_liquid_enthalpy, saturated_vapor_density,
    saturated_vapor_enthalpy, saturation_pressure, saturation_temperature,
    vapor_density_at_pressure, vapor_density_slope,
};
