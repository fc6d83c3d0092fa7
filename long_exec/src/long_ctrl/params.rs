//! Parameters structure for LongCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::curve::Curve;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vehicle tuning for longitudinal control.
///
/// All curves are indexed by ego speed in meters/second.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GAINS ----

    /// Proportional gain schedule.
    pub kp: Curve,

    /// Integral gain schedule.
    pub ki: Curve,

    /// Feedforward gain applied to the target acceleration.
    #[serde(default = "default_k_f")]
    pub k_f: f64,

    /// Half-width of the speed error deadzone.
    ///
    /// Units: meters/second
    pub deadzone: Curve,

    /// Fraction of a second the PI output must be saturated for before it is reported as
    /// saturated.
    #[serde(default = "default_sat_limit")]
    pub sat_limit: f64,

    // ---- LIMITS ----

    /// Maximum gas demand.
    pub gas_max: Curve,

    /// Maximum brake demand.
    pub brake_max: Curve,

    // ---- BEHAVIOUR ----

    /// True if the car's own stopping control holds it at a standstill. If false overshoot
    /// prevention is used near zero speed.
    #[serde(default)]
    pub stopping_control: bool,

    /// Use the dynamic gas collaborator to set the gas ceiling.
    #[serde(default)]
    pub enable_dynamic_gas: bool,

    /// Time headway used until perception reports one.
    ///
    /// Units: seconds
    #[serde(default = "default_time_headway_s")]
    pub default_time_headway_s: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// All-zero tuning, which can produce no actuation.
    fn default() -> Self {
        Self {
            kp: Curve::default(),
            ki: Curve::default(),
            k_f: default_k_f(),
            deadzone: Curve::default(),
            sat_limit: default_sat_limit(),
            gas_max: Curve::default(),
            brake_max: Curve::default(),
            stopping_control: false,
            enable_dynamic_gas: false,
            default_time_headway_s: default_time_headway_s()
        }
    }
}

fn default_k_f() -> f64 {
    1.0
}

fn default_sat_limit() -> f64 {
    0.8
}

fn default_time_headway_s() -> f64 {
    1.8
}
