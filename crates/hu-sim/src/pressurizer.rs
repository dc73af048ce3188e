//! Pressurizer phase-change model.
//!
//! Five channels move mass between the liquid and the steam space each tick:
//!
//! | channel   | direction | active when                                   |
//! |-----------|-----------|-----------------------------------------------|
//! | flash     | evaporate | pressure falling and liquid superheated       |
//! | heater    | evaporate | heater power exceeds the sensible-heat demand |
//! | spray     | condense  | spray flowing (reactor coolant pumps running) |
//! | wall      | condense  | shell colder than Tsat                        |
//! | rainout   | condense  | steam compressed below Tsat                   |
//!
//! Each channel returns zero when it does not apply. Masses and volumes live
//! in the shared [`PressurizerInventory`]; this module owns only the
//! temperatures, the heater lag and the last rates.

use crate::flows::gpm_to_lbm_per_s;
use hu_controls::{FirstOrderLag, LagState};
use hu_core::constants::flow::MAX_SPRAY_GPM;
use hu_core::constants::physics::{
    RANKINE_OFFSET, STEAM_CP_BTU_PER_LBM_F, STEAM_POLYTROPIC_EXPONENT,
};
use hu_core::constants::plant::{
    HEATER_TIME_CONSTANT_S, PZR_HEIGHT_FT, PZR_WALL_AREA_FT2, PZR_WALL_HEAT_CAPACITY_BTU_PER_F,
};
use hu_core::constants::setpoints::{SPRAY_PROPORTIONAL_BAND_PSI, SPRAY_START_OFFSET_PSI};
use hu_core::lag_fraction;
use hu_core::units::kw_to_btu_per_s;
use hu_props::{
    film_condensation_coefficient, latent_heat, liquid_density, saturation_temperature,
    specific_heat,
};
use hu_solver::PressurizerInventory;
use serde::{Deserialize, Serialize};

/// Flash rate per unit superheat mass and depressurization rate (1/psi).
const FLASH_COEFFICIENT_PER_PSI: f64 = 0.05;
/// Fraction of the ideal spray condensation actually achieved.
const SPRAY_EFFECTIVENESS: f64 = 0.85;
/// Condensation time constant of subcooled steam (s).
const RAINOUT_TIME_CONSTANT_S: f64 = 5.0;
/// Relaxation time constant of superheated steam toward Tsat (s).
const SUPERHEAT_TIME_CONSTANT_S: f64 = 30.0;
/// Largest fraction of the steam mass that may condense in one tick.
const MAX_CONDENSED_FRACTION: f64 = 0.5;

/// Per-channel phase-change rates (lbm/s, all non-negative).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseChangeRates {
    pub flash: f64,
    pub heater: f64,
    pub spray_condensation: f64,
    pub wall_condensation: f64,
    pub rainout: f64,
}

impl PhaseChangeRates {
    /// Signed net evaporation rate: positive makes steam.
    pub fn net(&self) -> f64 {
        self.flash + self.heater - self.condensation()
    }

    pub fn condensation(&self) -> f64 {
        self.spray_condensation + self.wall_condensation + self.rainout
    }
}

/// Thermal and kinetic state of the pressurizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressurizerState {
    pub liquid_temp_f: f64,
    pub vapor_temp_f: f64,
    pub wall_temp_f: f64,
    /// Effective heater power (kW) behind the element lag.
    pub heater: LagState,
    pub rates: PhaseChangeRates,
    pub bubble_formed: bool,
}

impl PressurizerState {
    /// Saturated steam over liquid at `liquid_temp_f`, with the shell in
    /// equilibrium with the liquid.
    pub fn saturated(pressure_psia: f64, liquid_temp_f: f64, heater_kw: f64) -> Self {
        Self {
            liquid_temp_f,
            vapor_temp_f: saturation_temperature(pressure_psia),
            wall_temp_f: liquid_temp_f,
            heater: LagState { value: heater_kw },
            rates: PhaseChangeRates::default(),
            bubble_formed: true,
        }
    }

    pub fn is_solid(&self) -> bool {
        !self.bubble_formed
    }
}

/// Heater element lag.
pub fn heater_lag() -> FirstOrderLag {
    FirstOrderLag {
        tau: HEATER_TIME_CONSTANT_S,
    }
}

/// Advance the effective heater power toward `command_kw`.
pub fn advance_heater(heater: &LagState, command_kw: f64, dt_s: f64) -> LagState {
    heater_lag().step(heater, dt_s, command_kw.max(0.0))
}

/// Spray demand (gpm): proportional from `setpoint + 25` psi to full flow
/// one band higher. Spray is driven by pump head, so none without pumps.
pub fn spray_flow_gpm(pressure_psia: f64, setpoint_psia: f64, pumps_running: bool) -> f64 {
    if !pumps_running {
        return 0.0;
    }
    let excess = pressure_psia - setpoint_psia - SPRAY_START_OFFSET_PSI;
    MAX_SPRAY_GPM * (excess / SPRAY_PROPORTIONAL_BAND_PSI).clamp(0.0, 1.0)
}

/// Flash evaporation of superheated liquid during depressurization (lbm/s).
pub fn flash_rate(
    liquid_mass_lbm: f64,
    liquid_temp_f: f64,
    t_sat_f: f64,
    pressure_rate_psi_per_s: f64,
    dt_s: f64,
) -> f64 {
    if pressure_rate_psi_per_s >= 0.0 || liquid_temp_f <= t_sat_f {
        return 0.0;
    }
    let available = liquid_mass_lbm * specific_heat(liquid_temp_f) * (liquid_temp_f - t_sat_f)
        / latent_heat(t_sat_f);
    (available / dt_s).min(available * FLASH_COEFFICIENT_PER_PSI * -pressure_rate_psi_per_s)
}

/// Heater power split into sensible heating and steam production.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterSplit {
    /// Power raising the liquid toward Tsat (BTU/s).
    pub sensible_btu_per_s: f64,
    /// Steam produced by the remainder (lbm/s).
    pub steam_lbm_per_s: f64,
}

pub fn heater_partition(
    heater_btu_per_s: f64,
    liquid_mass_lbm: f64,
    liquid_temp_f: f64,
    t_sat_f: f64,
    dt_s: f64,
) -> HeaterSplit {
    let q = heater_btu_per_s.max(0.0);
    let need =
        (liquid_mass_lbm * specific_heat(liquid_temp_f) * (t_sat_f - liquid_temp_f) / dt_s).max(0.0);
    let sensible = q.min(need);
    HeaterSplit {
        sensible_btu_per_s: sensible,
        steam_lbm_per_s: (q - sensible) / latent_heat(t_sat_f),
    }
}

/// Steam condensed on subcooled spray (lbm/s).
pub fn spray_condensation_rate(spray_lbm_per_s: f64, spray_temp_f: f64, t_sat_f: f64) -> f64 {
    if spray_lbm_per_s <= 0.0 || spray_temp_f >= t_sat_f {
        return 0.0;
    }
    SPRAY_EFFECTIVENESS * spray_lbm_per_s * specific_heat(spray_temp_f) * (t_sat_f - spray_temp_f)
        / latent_heat(t_sat_f)
}

/// Film condensation on the steam-side shell (lbm/s).
pub fn wall_condensation_rate(
    wall_temp_f: f64,
    t_sat_f: f64,
    vapor_volume_fraction: f64,
) -> f64 {
    let subcooling = t_sat_f - wall_temp_f;
    if subcooling <= 0.0 || vapor_volume_fraction <= 0.0 {
        return 0.0;
    }
    let h = film_condensation_coefficient(t_sat_f, subcooling, PZR_HEIGHT_FT);
    let area = PZR_WALL_AREA_FT2 * vapor_volume_fraction.min(1.0);
    h * area * subcooling / latent_heat(t_sat_f)
}

/// Steam temperature after a polytropic pressure change.
pub fn polytropic_vapor_temperature(vapor_temp_f: f64, p_before_psia: f64, p_after_psia: f64) -> f64 {
    let exponent = (STEAM_POLYTROPIC_EXPONENT - 1.0) / STEAM_POLYTROPIC_EXPONENT;
    (vapor_temp_f + RANKINE_OFFSET) * (p_after_psia / p_before_psia).powf(exponent) - RANKINE_OFFSET
}

/// Rainout of subcooled steam.
///
/// Returns the condensation rate (lbm/s) and the steam temperature at the
/// end of the step.
pub fn rainout(
    vapor_mass_lbm: f64,
    compressed_vapor_temp_f: f64,
    t_sat_f: f64,
    dt_s: f64,
) -> (f64, f64) {
    if compressed_vapor_temp_f < t_sat_f {
        let frac = lag_fraction(dt_s, RAINOUT_TIME_CONSTANT_S);
        let rate = vapor_mass_lbm * STEAM_CP_BTU_PER_LBM_F * (t_sat_f - compressed_vapor_temp_f)
            * frac
            / latent_heat(t_sat_f)
            / dt_s;
        (rate, compressed_vapor_temp_f + (t_sat_f - compressed_vapor_temp_f) * frac)
    } else {
        let frac = lag_fraction(dt_s, SUPERHEAT_TIME_CONSTANT_S);
        (0.0, compressed_vapor_temp_f + (t_sat_f - compressed_vapor_temp_f) * frac)
    }
}

/// Forcing for one pressurizer step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressurizerInputs {
    /// Pressure after this tick's coupled solve.
    pub pressure_psia: f64,
    /// Pressure change rate over the solve (psi/s).
    pub pressure_rate_psi_per_s: f64,
    pub heater_command_kw: f64,
    pub spray_gpm: f64,
    /// Spray source temperature (loop).
    pub spray_temp_f: f64,
    pub ambient_temp_f: f64,
    /// Shell-to-ambient conductance (BTU/(s·°F)).
    pub ambient_ua: f64,
}

/// Heat exchanged over one pressurizer step (BTU).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PressurizerHeat {
    pub heater_btu: f64,
    pub ambient_loss_btu: f64,
}

/// Advance the two-phase pressurizer by `dt_s`.
///
/// Rates are computed from the state at the start of the step. Condensation
/// is capped so at most half the steam mass condenses in one tick; the
/// inventory masses and volumes are then moved by the net amount.
pub fn step(
    state: &mut PressurizerState,
    inventory: &mut PressurizerInventory,
    vessel_volume_ft3: f64,
    inputs: &PressurizerInputs,
    dt_s: f64,
) -> PressurizerHeat {
    let p = inputs.pressure_psia;
    let t_sat = saturation_temperature(p);
    let h_fg = latent_heat(t_sat);
    let liquid_mass = inventory.liquid_mass_lbm;
    let vapor_fraction = (inventory.vapor_volume_ft3 / vessel_volume_ft3).clamp(0.0, 1.0);
    let liquid_fraction = 1.0 - vapor_fraction;

    state.heater = advance_heater(&state.heater, inputs.heater_command_kw, dt_s);
    let heater_btu_per_s = kw_to_btu_per_s(state.heater.value);

    let flash = flash_rate(
        liquid_mass,
        state.liquid_temp_f,
        t_sat,
        inputs.pressure_rate_psi_per_s,
        dt_s,
    );
    let split = heater_partition(heater_btu_per_s, liquid_mass, state.liquid_temp_f, t_sat, dt_s);
    let spray_lbm_per_s = gpm_to_lbm_per_s(inputs.spray_gpm.max(0.0));
    let mut spray = spray_condensation_rate(spray_lbm_per_s, inputs.spray_temp_f, t_sat);
    let mut wall = wall_condensation_rate(state.wall_temp_f, t_sat, vapor_fraction);

    let p_before = p - inputs.pressure_rate_psi_per_s * dt_s;
    let compressed = if p_before > 0.0 {
        polytropic_vapor_temperature(state.vapor_temp_f, p_before, p)
    } else {
        state.vapor_temp_f
    };
    let (mut rain, vapor_temp) = rainout(inventory.vapor_mass_lbm, compressed, t_sat, dt_s);

    let condensation = spray + wall + rain;
    let max_condensation = MAX_CONDENSED_FRACTION * inventory.vapor_mass_lbm / dt_s;
    if condensation > max_condensation {
        let scale = max_condensation / condensation;
        spray *= scale;
        wall *= scale;
        rain *= scale;
    }
    let mut rates = PhaseChangeRates {
        flash,
        heater: split.steam_lbm_per_s,
        spray_condensation: spray,
        wall_condensation: wall,
        rainout: rain,
    };
    let evaporation = rates.flash + rates.heater;
    if evaporation * dt_s > liquid_mass {
        let scale = liquid_mass / (evaporation * dt_s);
        rates.flash *= scale;
        rates.heater *= scale;
    }

    // Liquid energy: sensible heat, flash cooling, ambient loss below the
    // water line, spray mixing, then condensate returned at Tsat.
    let heat_capacity = liquid_mass * specific_heat(state.liquid_temp_f);
    let liquid_loss = inputs.ambient_ua * liquid_fraction * (state.liquid_temp_f - inputs.ambient_temp_f);
    let mut t_l = state.liquid_temp_f;
    if heat_capacity > 0.0 {
        t_l += (split.sensible_btu_per_s - rates.flash * h_fg - liquid_loss) * dt_s / heat_capacity;
    }
    let spray_mass = spray_lbm_per_s * dt_s;
    if spray_mass > 0.0 {
        t_l = (liquid_mass * t_l + spray_mass * inputs.spray_temp_f) / (liquid_mass + spray_mass);
    }
    let condensate = rates.condensation() * dt_s;
    if condensate > 0.0 {
        t_l = (liquid_mass * t_l + condensate * t_sat) / (liquid_mass + condensate);
    }

    let wall_loss =
        inputs.ambient_ua * vapor_fraction * (state.wall_temp_f - inputs.ambient_temp_f);
    state.wall_temp_f +=
        (rates.wall_condensation * h_fg - wall_loss) * dt_s / PZR_WALL_HEAT_CAPACITY_BTU_PER_F;
    state.liquid_temp_f = t_l;
    state.vapor_temp_f = vapor_temp;
    state.rates = rates;

    inventory.evaporate(rates.net() * dt_s, liquid_density(t_l, p));

    PressurizerHeat {
        heater_btu: heater_btu_per_s * dt_s,
        ambient_loss_btu: (liquid_loss + wall_loss) * dt_s,
    }
}
