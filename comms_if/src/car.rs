//! # Car state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The state of the vehicle as reported over the CAN bus this cycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarState {
    /// Ego speed in meters/second.
    ///
    /// Most cars report 0 below about 0.3 m/s.
    pub v_ego_ms: f64,

    /// True if the driver is pressing the gas pedal.
    pub gas_pressed: bool,

    /// True if the driver is pressing the brake pedal.
    pub brake_pressed: bool,

    /// True if the car is stationary.
    pub standstill: bool,

    /// True if the car's own cruise control is holding the car at a standstill.
    pub cruise_standstill: bool,

    /// Left turn signal on
    pub left_blinker: bool,

    /// Right turn signal on
    pub right_blinker: bool
}

impl CarState {
    /// True if either turn signal is on.
    pub fn blinker_on(&self) -> bool {
        self.left_blinker || self.right_blinker
    }
}
