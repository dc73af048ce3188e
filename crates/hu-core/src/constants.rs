//! Canonical constants for the reference four-loop plant.
//!
//! Every module reads geometry and interlock setpoints from here. Controller
//! gains are tuning values and live next to the controller that uses them.

/// Fixed geometry and lumped heat capacities.
pub mod plant {
    /// Reactor coolant loop volume excluding the pressurizer (ft³).
    pub const LOOP_VOLUME_FT3: f64 = 11_500.0;
    /// Pressurizer internal volume (ft³).
    pub const PZR_VOLUME_FT3: f64 = 1_800.0;
    /// Pressurizer internal height (ft), used as the condensing wall length.
    pub const PZR_HEIGHT_FT: f64 = 52.75;
    /// Pressurizer inner wall area (ft²).
    pub const PZR_WALL_AREA_FT2: f64 = 1_240.0;
    /// Pressurizer shell: 120,000 lbm of steel at 0.12 BTU/(lbm·°F).
    pub const PZR_WALL_HEAT_CAPACITY_BTU_PER_F: f64 = 120_000.0 * 0.12;
    /// Loop piping, vessel and steam generator metal (BTU/°F).
    pub const RCS_METAL_HEAT_CAPACITY_BTU_PER_F: f64 = 250_000.0;
    /// Installed pressurizer heater capacity (kW).
    pub const PZR_HEATER_CAPACITY_KW: f64 = 1_800.0;
    /// Heater element thermal time constant (s).
    pub const HEATER_TIME_CONSTANT_S: f64 = 20.0;
    /// Number of reactor coolant pumps.
    pub const RCP_COUNT: u8 = 4;
    /// Volume control tank volume (ft³).
    pub const VCT_VOLUME_FT3: f64 = 400.0;
}

/// Chemical and volume control flows (gpm unless noted).
pub mod flow {
    pub const NORMAL_CHARGING_GPM: f64 = 75.0;
    pub const NORMAL_LETDOWN_GPM: f64 = 75.0;
    pub const MAX_LETDOWN_GPM: f64 = 120.0;
    pub const MAX_CHARGING_GPM: f64 = 150.0;
    pub const SEAL_INJECTION_GPM_PER_PUMP: f64 = 8.0;
    pub const SEAL_RETURN_GPM_PER_PUMP: f64 = 3.0;
    /// Orifice letdown is rated at this pressure and scales with √P below it.
    pub const ORIFICE_RATED_PRESSURE_PSIA: f64 = 2_250.0;
    pub const MAX_RELIEF_GPM: f64 = 500.0;
    /// Relief flow per psi above the reseat pressure.
    pub const RELIEF_GPM_PER_PSI: f64 = 10.0;
    pub const MAX_SPRAY_GPM: f64 = 900.0;
    pub const MAX_DIVERT_GPM: f64 = 120.0;
    pub const MAKEUP_GPM: f64 = 80.0;
    /// Flow meters are calibrated against water at this state.
    pub const FLOW_REFERENCE_TEMP_F: f64 = 100.0;
    pub const FLOW_REFERENCE_PRESSURE_PSIA: f64 = 14.7;
}

/// Setpoints and interlocks.
pub mod setpoints {
    pub const SOLID_PRESSURE_SETPOINT_PSIA: f64 = 350.0;
    pub const SOLID_BAND_LOW_PSIA: f64 = 320.0;
    pub const SOLID_BAND_HIGH_PSIA: f64 = 400.0;
    pub const RELIEF_OPEN_PSIA: f64 = 450.0;
    pub const RELIEF_RESEAT_PSIA: f64 = 425.0;
    /// Minimum pressure for reactor coolant pump start (seal differential).
    pub const PUMP_START_MIN_PSIA: f64 = 400.0;
    /// Letdown isolates below this pressurizer level (%).
    pub const LETDOWN_ISOLATION_LEVEL_PCT: f64 = 17.0;
    /// Residual heat removal cross-connect is available below both limits.
    pub const RHR_CROSS_CONNECT_MAX_TEMP_F: f64 = 350.0;
    pub const RHR_CROSS_CONNECT_MAX_PRESSURE_PSIA: f64 = 450.0;
    /// Spray starts this far above the heater pressure setpoint (psi).
    pub const SPRAY_START_OFFSET_PSI: f64 = 25.0;
    /// Spray reaches full flow over this span (psi).
    pub const SPRAY_PROPORTIONAL_BAND_PSI: f64 = 50.0;
    /// Hot standby: no-load loop temperature and normal operating pressure.
    pub const NO_LOAD_TEMP_F: f64 = 557.0;
    pub const HOT_STANDBY_PRESSURE_PSIA: f64 = 2_235.0;
    pub const LEVEL_PROGRAM_LOW_TEMP_F: f64 = NO_LOAD_TEMP_F;
    pub const LEVEL_PROGRAM_HIGH_TEMP_F: f64 = 584.7;
    pub const LEVEL_PROGRAM_LOW_PCT: f64 = 25.0;
    pub const LEVEL_PROGRAM_HIGH_PCT: f64 = 61.5;
    pub const VCT_DIVERT_ON_PCT: f64 = 70.0;
    pub const VCT_DIVERT_OFF_PCT: f64 = 65.0;
    /// Divert valve is fully open this far above the off setpoint (%).
    pub const VCT_DIVERT_SPAN_PCT: f64 = 25.0;
    pub const VCT_MAKEUP_ON_PCT: f64 = 20.0;
    pub const VCT_MAKEUP_OFF_PCT: f64 = 40.0;
    pub const VCT_EMERGENCY_SUCTION_ON_PCT: f64 = 5.0;
    pub const VCT_EMERGENCY_SUCTION_OFF_PCT: f64 = 10.0;
    pub const RWST_BORON_PPM: f64 = 2_400.0;
    pub const PZR_LEVEL_HIGH_ALARM_PCT: f64 = 92.0;
    pub const VCT_LEVEL_HIGH_ALARM_PCT: f64 = 80.0;
    pub const VCT_LEVEL_LOW_ALARM_PCT: f64 = 20.0;
    pub const SUBCOOLING_LOW_ALARM_F: f64 = 50.0;
    pub const HEATUP_RATE_HIGH_ALARM_F_PER_HR: f64 = 100.0;
    pub const TWO_PHASE_PRESSURE_HIGH_ALARM_PSIA: f64 = 2_335.0;
}

/// Physical constants in the plant's units.
pub mod physics {
    pub const ATMOSPHERIC_PSIA: f64 = 14.696;
    pub const STANDARD_GRAVITY_M_S2: f64 = 9.806_65;
    /// Steam specific heat near saturation for the rainout balance (BTU/(lbm·°F)).
    pub const STEAM_CP_BTU_PER_LBM_F: f64 = 0.6;
    /// Polytropic exponent of pressurizer steam.
    pub const STEAM_POLYTROPIC_EXPONENT: f64 = 1.3;
    pub const RANKINE_OFFSET: f64 = 459.67;
}
