//! Successive substitution on pressure.
//!
//! Each iteration, at trial pressure `P`:
//!
//! ```text
//! dV_loop  = V_loop · (β·ΔT_eff − κ·(P − P0))      loop expansion not absorbed by compression
//! surge    = dV_loop · ρ_loop(T_eff, P)            mass pushed into the pressurizer
//! V_l      = (M_l + surge) / ρ_pzr(T_pzr, P)
//! V_v      = V_pzr − V_l
//! P_target = P + (M_v / V_v − ρ_g(P)) / (dρ_g/dP)  pressure at which the steam is saturated
//! P        ← clamp(P + ω·(P_target − P), floor, ceiling)
//! ```
//!
//! until both the pressure and steam-volume updates fall below tolerance.

use crate::config::{PressureBand, SolverConfig};
use crate::state::{MIN_VAPOR_VOLUME_FT3, SystemState};
use hu_core::precondition;
use hu_props::{
    compressibility, expansion_coefficient, liquid_density, vapor_density_at_pressure,
    vapor_density_slope,
};
use tracing::debug;

/// Forcing for one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveInput {
    /// Bulk loop temperature change over the step (°F).
    pub loop_temp_change_f: f64,
    /// Pressurizer liquid temperature (°F).
    pub pzr_liquid_temp_f: f64,
    /// Fraction of the loop temperature change that reaches the steam cushion.
    ///
    /// 1.0 with forced circulation. Below 1.0 models the slower, partly
    /// non-equilibrium response of a stagnant loop; the value is an
    /// empirical fit.
    pub thermal_damping: f64,
}

/// Result of a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOutcome {
    pub converged: bool,
    /// A band limit was active on the last iterate.
    pub clamped: bool,
    pub iterations: usize,
    /// Mass moved from the loop into the pressurizer (lbm, negative for outsurge).
    pub surge_mass_lbm: f64,
    pub pressure_change_psi: f64,
    /// Last pressure update (psi).
    pub last_update_psi: f64,
    /// The insurge was cut back to keep the minimum steam space.
    pub pressurizer_full: bool,
}

struct Partition {
    surge_mass: f64,
    full: bool,
    liquid_mass: f64,
    liquid_volume: f64,
    vapor_volume: f64,
}

struct Forcing {
    p0: f64,
    t0: f64,
    t_eff: f64,
    t_pzr: f64,
}

fn partition(state: &SystemState, forcing: &Forcing, p: f64) -> Partition {
    let t_mid = 0.5 * (forcing.t0 + forcing.t_eff);
    let beta = expansion_coefficient(t_mid, p);
    let kappa = compressibility(forcing.t_eff);
    let dv_loop = state.loop_volume_ft3
        * (beta * (forcing.t_eff - forcing.t0) - kappa * (p - forcing.p0));

    let inv = &state.pressurizer;
    let rho_pzr = liquid_density(forcing.t_pzr, p);
    // The pressurizer cannot send more liquid than it holds, nor take more
    // than leaves the minimum steam space; the loop keeps the remainder
    let demand = (dv_loop * liquid_density(forcing.t_eff, p)).max(-inv.liquid_mass_lbm);
    let room = (state.pzr_volume_ft3 - MIN_VAPOR_VOLUME_FT3) * rho_pzr - inv.liquid_mass_lbm;
    let full = demand > room;
    let surge_mass = if full { room } else { demand };
    let liquid_mass = inv.liquid_mass_lbm + surge_mass;
    let liquid_volume = liquid_mass / rho_pzr;
    let vapor_volume = (state.pzr_volume_ft3 - liquid_volume).max(MIN_VAPOR_VOLUME_FT3);
    Partition {
        surge_mass,
        full,
        liquid_mass,
        liquid_volume,
        vapor_volume,
    }
}

/// Resolve the equilibrium pressure after the loop temperature changes.
///
/// Mutates `state` in place: pressure, loop temperature, loop mass and the
/// pressurizer liquid inventory. Always produces an answer. When the
/// iteration cap is reached, or a band limit holds the pressure, the best
/// relaxed estimate is committed and `converged` is false.
///
/// Mass leaving the loop is exactly the mass entering the pressurizer, so
/// total mass is preserved to rounding. The pressurizer volume is preserved
/// too: an insurge that would fill the steam space is cut back to leave
/// [`MIN_VAPOR_VOLUME_FT3`], and the result is reported as
/// `pressurizer_full` and never converged.
pub fn solve_equilibrium(
    state: &mut SystemState,
    input: &SolveInput,
    band: &PressureBand,
    config: &SolverConfig,
) -> SolveOutcome {
    let damping = precondition(input.thermal_damping, 0.0, 1.0, "thermal damping");
    let vapor_mass = precondition(
        state.pressurizer.vapor_mass_lbm,
        f64::MIN_POSITIVE,
        f64::MAX,
        "steam mass for a two-phase solve",
    );
    let forcing = Forcing {
        p0: state.pressure_psia,
        t0: state.loop_temp_f,
        t_eff: state.loop_temp_f + damping * input.loop_temp_change_f,
        t_pzr: input.pzr_liquid_temp_f,
    };

    let mut p = band.clamp(forcing.p0).0;
    let mut prev_vapor_volume = state.pressurizer.vapor_volume_ft3;
    let mut converged = false;
    let mut clamped = false;
    let mut iterations = 0;
    let mut last_update = 0.0;

    while iterations < config.max_iterations {
        iterations += 1;
        let part = partition(state, &forcing, p);
        let vapor_density = vapor_mass / part.vapor_volume;
        let target = p + (vapor_density - vapor_density_at_pressure(p)) / vapor_density_slope(p);
        let (next, hit_limit) = band.clamp(p + config.relaxation * (target - p));

        last_update = (next - p).abs();
        let dv = (part.vapor_volume - prev_vapor_volume).abs();
        p = next;
        prev_vapor_volume = part.vapor_volume;
        clamped = hit_limit;

        if !hit_limit
            && !part.full
            && last_update < config.pressure_tolerance_psi
            && dv < config.volume_tolerance_ft3
        {
            converged = true;
            break;
        }
    }

    let part = partition(state, &forcing, p);
    state.pressure_psia = p;
    state.loop_temp_f = forcing.t0 + input.loop_temp_change_f;
    state.loop_mass_lbm -= part.surge_mass;
    state.pressurizer.liquid_mass_lbm = part.liquid_mass;
    state.pressurizer.liquid_volume_ft3 = part.liquid_volume;
    state.pressurizer.vapor_volume_ft3 = part.vapor_volume;

    let converged = converged && !part.full;
    debug!(
        iterations,
        converged,
        clamped,
        pressurizer_full = part.full,
        pressure_psia = p,
        "coupled solve"
    );

    SolveOutcome {
        converged,
        clamped,
        iterations,
        surge_mass_lbm: part.surge_mass,
        pressure_change_psi: p - forcing.p0,
        last_update_psi: last_update,
        pressurizer_full: part.full,
    }
}
