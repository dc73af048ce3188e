//! Two-setpoint latch.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Which side of the setpoint trips the switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripDirection {
    /// Trips at or above `set`, resets below `reset` (reset < set).
    High,
    /// Trips at or below `set`, resets at or above `reset` (reset > set).
    Low,
}

/// Latching switch with separate trip and reset points.
///
/// The latched flag is held by the caller's state; [`update`](Self::update)
/// maps the previous flag and the current value to the next flag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HysteresisSwitch {
    pub set: f64,
    pub reset: f64,
    pub direction: TripDirection,
}

impl HysteresisSwitch {
    pub fn high(set: f64, reset: f64) -> ControlResult<Self> {
        if reset >= set {
            return Err(ControlError::InvalidArg {
                what: "high trip needs reset below set",
            });
        }
        Ok(Self {
            set,
            reset,
            direction: TripDirection::High,
        })
    }

    pub fn low(set: f64, reset: f64) -> ControlResult<Self> {
        if reset <= set {
            return Err(ControlError::InvalidArg {
                what: "low trip needs reset above set",
            });
        }
        Ok(Self {
            set,
            reset,
            direction: TripDirection::Low,
        })
    }

    pub fn update(&self, active: bool, value: f64) -> bool {
        match (self.direction, active) {
            (TripDirection::High, false) => value >= self.set,
            (TripDirection::High, true) => value >= self.reset,
            (TripDirection::Low, false) => value <= self.set,
            (TripDirection::Low, true) => value < self.reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_trip_holds_through_brief_dip() {
        let sw = HysteresisSwitch::high(450.0, 425.0).unwrap();
        let mut on = false;
        on = sw.update(on, 449.9);
        assert!(!on);
        on = sw.update(on, 450.0);
        assert!(on);
        // Dip below the trip point but above reset
        on = sw.update(on, 440.0);
        assert!(on);
        on = sw.update(on, 424.9);
        assert!(!on);
        // Back between the setpoints: stays reset
        on = sw.update(on, 440.0);
        assert!(!on);
    }

    #[test]
    fn low_trip_latches_until_reset() {
        let sw = HysteresisSwitch::low(20.0, 40.0).unwrap();
        let mut on = sw.update(false, 20.0);
        assert!(on);
        on = sw.update(on, 39.0);
        assert!(on);
        on = sw.update(on, 40.0);
        assert!(!on);
    }

    #[test]
    fn rejects_inverted_setpoints() {
        assert!(HysteresisSwitch::high(425.0, 450.0).is_err());
        assert!(HysteresisSwitch::low(40.0, 20.0).is_err());
    }
}
