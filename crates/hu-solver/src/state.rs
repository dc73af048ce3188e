//! Loop and pressurizer inventory.

use crate::error::{SolverError, SolverResult};
use hu_core::constants::plant::{LOOP_VOLUME_FT3, PZR_VOLUME_FT3};
use hu_core::{ensure_finite, precondition};
use hu_props::{liquid_density, validate_liquid_state, vapor_density_at_pressure};
use serde::{Deserialize, Serialize};

/// Smallest steam volume the inventory keeps (ft³). Below it the
/// pressurizer is treated as water-solid.
pub const MIN_VAPOR_VOLUME_FT3: f64 = 1e-3;

/// Liquid and steam inventory of the pressurizer.
///
/// This is the single copy of pressurizer mass and volume. The solver moves
/// liquid across the surge line; the pressurizer model moves mass between
/// phases; flow application adds or removes liquid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressurizerInventory {
    pub liquid_mass_lbm: f64,
    pub vapor_mass_lbm: f64,
    pub liquid_volume_ft3: f64,
    pub vapor_volume_ft3: f64,
}

impl PressurizerInventory {
    pub fn total_mass(&self) -> f64 {
        self.liquid_mass_lbm + self.vapor_mass_lbm
    }

    pub fn total_volume(&self) -> f64 {
        self.liquid_volume_ft3 + self.vapor_volume_ft3
    }

    /// Liquid level as a percentage of `vessel_volume_ft3`, clamped to [0, 100].
    pub fn level_pct(&self, vessel_volume_ft3: f64) -> f64 {
        (100.0 * self.liquid_volume_ft3 / vessel_volume_ft3).clamp(0.0, 100.0)
    }

    /// Net evaporation of `mass_lbm` (negative condenses).
    ///
    /// Volumes follow the liquid at `liquid_density`; the steam takes the
    /// vacated space. Neither phase is allowed below zero mass.
    pub fn evaporate(&mut self, mass_lbm: f64, liquid_density: f64) {
        let mass = precondition(
            mass_lbm,
            -self.vapor_mass_lbm,
            self.liquid_mass_lbm,
            "phase change mass",
        );
        let dv = mass / liquid_density;
        self.liquid_mass_lbm -= mass;
        self.vapor_mass_lbm += mass;
        self.liquid_volume_ft3 -= dv;
        self.vapor_volume_ft3 += dv;
    }

    /// Adds `mass_lbm` of liquid (negative removes it).
    ///
    /// Liquid that would leave less than [`MIN_VAPOR_VOLUME_FT3`] of steam
    /// space is refused; the refused mass (lbm) is returned.
    pub fn add_liquid(&mut self, mass_lbm: f64, liquid_density: f64) -> f64 {
        let mass = precondition(
            mass_lbm,
            -self.liquid_mass_lbm,
            f64::MAX,
            "pressurizer liquid addition",
        );
        let room = (self.vapor_volume_ft3 - MIN_VAPOR_VOLUME_FT3).max(0.0) * liquid_density;
        let admitted = mass.min(room);
        let dv = admitted / liquid_density;
        self.liquid_mass_lbm += admitted;
        self.liquid_volume_ft3 += dv;
        self.vapor_volume_ft3 -= dv;
        mass - admitted
    }

    /// Re-close the two volumes on `vessel_volume_ft3`, keeping the liquid
    /// volume unless that would leave less than the minimum steam space.
    pub fn fit_vessel(&mut self, vessel_volume_ft3: f64) {
        self.liquid_volume_ft3 = self
            .liquid_volume_ft3
            .clamp(0.0, vessel_volume_ft3 - MIN_VAPOR_VOLUME_FT3);
        self.vapor_volume_ft3 = vessel_volume_ft3 - self.liquid_volume_ft3;
    }
}

/// Thermodynamic state of the coupled loop and pressurizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    pub pressure_psia: f64,
    /// Bulk loop temperature (°F).
    pub loop_temp_f: f64,
    pub loop_volume_ft3: f64,
    pub loop_mass_lbm: f64,
    pub pzr_volume_ft3: f64,
    pub pressurizer: PressurizerInventory,
}

impl SystemState {
    /// Reference plant at `pressure_psia` with saturated steam over liquid at
    /// `pzr_liquid_temp_f`, filled to `level_pct`.
    pub fn two_phase(
        pressure_psia: f64,
        loop_temp_f: f64,
        pzr_liquid_temp_f: f64,
        level_pct: f64,
    ) -> SolverResult<Self> {
        validate_liquid_state(loop_temp_f, pressure_psia)?;
        validate_liquid_state(pzr_liquid_temp_f, pressure_psia)?;
        if !(level_pct > 0.0 && level_pct < 100.0) {
            return Err(SolverError::InvalidState {
                what: "two-phase level must be strictly between 0 and 100",
            });
        }
        let liquid_volume = PZR_VOLUME_FT3 * level_pct / 100.0;
        let vapor_volume = PZR_VOLUME_FT3 - liquid_volume;
        let state = Self {
            pressure_psia,
            loop_temp_f,
            loop_volume_ft3: LOOP_VOLUME_FT3,
            loop_mass_lbm: LOOP_VOLUME_FT3 * liquid_density(loop_temp_f, pressure_psia),
            pzr_volume_ft3: PZR_VOLUME_FT3,
            pressurizer: PressurizerInventory {
                liquid_mass_lbm: liquid_volume * liquid_density(pzr_liquid_temp_f, pressure_psia),
                vapor_mass_lbm: vapor_volume * vapor_density_at_pressure(pressure_psia),
                liquid_volume_ft3: liquid_volume,
                vapor_volume_ft3: vapor_volume,
            },
        };
        state.validate()?;
        Ok(state)
    }

    pub fn total_mass(&self) -> f64 {
        self.loop_mass_lbm + self.pressurizer.total_mass()
    }

    pub fn total_volume(&self) -> f64 {
        self.loop_volume_ft3 + self.pressurizer.total_volume()
    }

    pub fn level_pct(&self) -> f64 {
        self.pressurizer.level_pct(self.pzr_volume_ft3)
    }

    pub fn validate(&self) -> SolverResult<()> {
        let inv = &self.pressurizer;
        ensure_finite(self.pressure_psia, "system pressure")?;
        ensure_finite(self.loop_temp_f, "loop temperature")?;
        ensure_finite(self.loop_mass_lbm, "loop mass")?;
        ensure_finite(inv.liquid_mass_lbm, "pressurizer liquid mass")?;
        ensure_finite(inv.vapor_mass_lbm, "pressurizer steam mass")?;
        ensure_finite(inv.liquid_volume_ft3, "pressurizer liquid volume")?;
        ensure_finite(inv.vapor_volume_ft3, "pressurizer steam volume")?;
        if self.loop_mass_lbm <= 0.0 || inv.liquid_mass_lbm < 0.0 || inv.vapor_mass_lbm < 0.0 {
            return Err(SolverError::InvalidState {
                what: "negative inventory",
            });
        }
        if inv.liquid_volume_ft3 < 0.0 || inv.vapor_volume_ft3 < 0.0 {
            return Err(SolverError::InvalidState {
                what: "negative pressurizer volume",
            });
        }
        Ok(())
    }
}
