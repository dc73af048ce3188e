//! Water-solid relief valve lift and reseat.

use hu_sim::HeatTransferConfig;
use hu_sim::solid_plant::{SolidInputs, SolidPlantController, SolidPlantState};

fn quiet_inputs() -> SolidInputs {
    SolidInputs {
        heater_command_kw: 0.0,
        loop_heat_kw: 0.0,
        ambient_temp_f: 80.0,
        heat_transfer: HeatTransferConfig {
            surge_line_ua: 0.0,
            pzr_ambient_ua: 0.0,
            loop_ambient_ua: 0.0,
        },
        flow_override: None,
        relief_test_gpm: 0.0,
    }
}

fn at_pressure(pressure_psia: f64, relief_open: bool) -> SolidPlantState {
    let mut state = SolidPlantState::new(pressure_psia, 150.0, 150.0).unwrap();
    state.relief_open = relief_open;
    state
}

#[test]
fn relief_holds_open_through_the_deadband() {
    let controller = SolidPlantController::new().unwrap();
    let inputs = quiet_inputs();

    let (opened, result) = controller.step(&at_pressure(455.0, false), &inputs, 1.0);
    assert!(opened.relief_open);
    assert!(result.relief_lifted);
    assert!(opened.relief_gpm > 0.0);
    assert!(opened.pressure_psia < 455.0);

    let (held, result) = controller.step(&at_pressure(440.0, true), &inputs, 1.0);
    assert!(held.relief_open);
    assert!(!result.relief_lifted && !result.relief_reseated);
    assert_eq!(held.relief_gpm, SolidPlantController::relief_flow_gpm(440.0));

    let (closed, result) = controller.step(&at_pressure(424.0, true), &inputs, 1.0);
    assert!(!closed.relief_open);
    assert!(result.relief_reseated);
    assert_eq!(closed.relief_gpm, 0.0);
}

#[test]
fn relief_stays_shut_below_the_lift_setpoint() {
    let controller = SolidPlantController::new().unwrap();
    let (state, result) = controller.step(&at_pressure(440.0, false), &quiet_inputs(), 1.0);
    assert!(!state.relief_open);
    assert_eq!(result.relief_lbm, 0.0);
}
