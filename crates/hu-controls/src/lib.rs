//! Control primitives for the heatup engine.
//!
//! Every block here is a pure function of its configuration and an explicit
//! state value: `update`/`step` take the previous state and return the next
//! one. The caller owns all state.
//!
//! - [`PIController`]: sampled PI with anti-windup, integral clamp, selectable
//!   action, bumpless initialization and anticipatory bias
//! - [`FirstOrderLag`]: exact discrete first-order lag (heater elements)
//! - [`HysteresisSwitch`]: two-setpoint latch (relief reseat, tank staging)

pub mod controller;
pub mod error;
pub mod hysteresis;
pub mod lag;

pub use controller::{ControlAction, PIController, PIControllerState};
pub use error::{ControlError, ControlResult};
pub use hysteresis::{HysteresisSwitch, TripDirection};
pub use lag::{FirstOrderLag, LagState};
