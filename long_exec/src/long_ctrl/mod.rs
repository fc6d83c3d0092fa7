//! # Longitudinal control module
//!
//! Longitudinal control turns the planner's speed and acceleration targets into normalised gas and
//! brake demands, once per 10 ms cycle.
//!
//! Which control law is used is decided by a small state machine:
//!
//! - `Off` - the controller is disengaged and demands nothing.
//! - `Tracking` - a PI controller tracks the target speed, with the target acceleration as
//!   feedforward.
//! - `Stopping` - the car is about to stop, the brake is ramped on at a fixed rate until the car is
//!   held at a standstill.
//! - `Starting` - the car is about to move off, the brake is ramped off before handing over to the
//!   PI controller.
//!
//! The ramps are scaled by the distance to the lead vehicle so that the controller brakes harder
//! and releases slower when close to it.
//!
//! The output is a single signed quantity, positive for gas and negative for brake, which is split
//! into the two demands at the end of the cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod gain_sched;
mod gas_limiter;
mod params;
mod pi_ctrl;
mod snapshot;
mod state;
mod state_trans;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use gain_sched::*;
pub use gas_limiter::*;
pub use params::*;
pub use pi_ctrl::*;
pub use snapshot::*;
pub use state::*;
pub use state_trans::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Control rate.
///
/// Units: Hz
pub const RATE_HZ: f64 = 100.0;

/// Speed below which the CAN bus reports zero.
///
/// Units: meters/second
pub const MIN_CAN_SPEED_MS: f64 = 0.3;

/// Rate at which the brake is applied while trying to stop.
///
/// Units: brake travel/second
pub const STOPPING_BRAKE_RATE: f64 = 0.2;

/// Rate at which the brake is released when moving off.
///
/// Units: brake travel/second
pub const STARTING_BRAKE_RATE: f64 = 0.8;

/// Minimum brake held to keep the car stationary.
pub const BRAKE_STOPPING_TARGET: f64 = 0.75;

/// Distance to the lead below which a stop is requested.
///
/// Units: meters
pub const STOP_REQUEST_LEAD_DIST_M: f64 = 4.0;

/// Stopping ramp factor against lead distance (meters).
pub const STOP_RAMP_BP: [f64; 8] = [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
pub const STOP_RAMP_V: [f64; 8] = [10.0, 5.0, 2.0, 1.0, 0.5, 0.1, 0.0, -0.1];

/// Starting ramp factor against lead distance (meters).
pub const START_RAMP_BP: [f64; 4] = [0.0, 2.0, 4.0, 6.0];
pub const START_RAMP_V: [f64; 4] = [0.0, 0.5, 1.0, 2.0];

/// Below this ego speed, and with a low target, overshoot prevention engages.
///
/// Units: meters/second
pub const PREVENT_OVERSHOOT_EGO_MS: f64 = 1.5;

/// Future target speed below which overshoot prevention engages.
///
/// Units: meters/second
pub const PREVENT_OVERSHOOT_TARGET_MS: f64 = 0.7;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised by LongCtrl.
#[derive(Debug, thiserror::Error)]
pub enum LongCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveInitError(String)
}
