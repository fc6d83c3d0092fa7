//! Longitudinal control mode state machine
//!
//! The transition function is pure, it depends only on its inputs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::MIN_CAN_SPEED_MS;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this speed a low target or a brake press means we want to stop.
///
/// Units: meters/second
pub const STOPPING_EGO_SPEED_MS: f64 = 0.5;

/// Targets below this count as a request to stop.
///
/// Units: meters/second
pub const STOPPING_TARGET_SPEED_MS: f64 = MIN_CAN_SPEED_MS + 0.01;

/// Future targets above this count as a request to move off.
///
/// Units: meters/second
pub const STARTING_TARGET_SPEED_MS: f64 = 0.5;

/// Below this speed a cruise standstill means we want to stop.
///
/// Units: meters/second
pub const CRUISE_STANDSTILL_SPEED_MS: f64 = 2.0;

/// Once the brake has been released to this level the PI controller takes over.
pub const BRAKE_THRESHOLD_TO_PID: f64 = 0.2;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of longitudinal control. Each mode is handled by a `mode_xyz` function of
/// `LongCtrl`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum LongCtrlMode {
    Off,
    Tracking,
    Stopping,
    Starting
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Inputs to the mode transition function.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TransInputs {
    /// Controller engaged.
    pub active: bool,

    /// Raw ego speed in meters/second (not floored).
    pub v_ego_ms: f64,

    /// Future target speed in meters/second.
    pub v_target_future_ms: f64,

    /// Current PI setpoint in meters/second.
    pub v_pid_ms: f64,

    /// Last signed output, gas positive and brake negative.
    pub output_gb: f64,

    pub brake_pressed: bool,

    pub cruise_standstill: bool,

    /// A stop has been requested, because the lead is very close.
    pub stop_requested: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LongCtrlMode {
    fn default() -> Self {
        LongCtrlMode::Off
    }
}

impl TransInputs {
    /// True if the car should be brought to a stop.
    pub fn stopping_condition(&self) -> bool {
        self.stop_requested
            || (self.v_ego_ms < CRUISE_STANDSTILL_SPEED_MS && self.cruise_standstill)
            || (self.v_ego_ms < STOPPING_EGO_SPEED_MS
                && ((self.v_pid_ms < STOPPING_TARGET_SPEED_MS
                    && self.v_target_future_ms < STOPPING_TARGET_SPEED_MS)
                    || self.brake_pressed))
    }

    /// True if the car should move off.
    pub fn starting_condition(&self) -> bool {
        self.v_target_future_ms > STARTING_TARGET_SPEED_MS && !self.cruise_standstill
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the mode for this cycle given the mode of the last cycle.
pub fn next_mode(mode: LongCtrlMode, inputs: &TransInputs) -> LongCtrlMode {
    if !inputs.active {
        return LongCtrlMode::Off
    }

    match mode {
        LongCtrlMode::Off => LongCtrlMode::Tracking,
        LongCtrlMode::Tracking => {
            if inputs.stopping_condition() {
                LongCtrlMode::Stopping
            }
            else {
                LongCtrlMode::Tracking
            }
        },
        LongCtrlMode::Stopping => {
            if inputs.starting_condition() {
                LongCtrlMode::Starting
            }
            else {
                LongCtrlMode::Stopping
            }
        },
        LongCtrlMode::Starting => {
            if inputs.stopping_condition() {
                LongCtrlMode::Stopping
            }
            else if inputs.output_gb >= -BRAKE_THRESHOLD_TO_PID {
                LongCtrlMode::Tracking
            }
            else {
                LongCtrlMode::Starting
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL_MODES: [LongCtrlMode; 4] = [
        LongCtrlMode::Off,
        LongCtrlMode::Tracking,
        LongCtrlMode::Stopping,
        LongCtrlMode::Starting
    ];

    /// Engaged and cruising, no condition met.
    fn cruising() -> TransInputs {
        TransInputs {
            active: true,
            v_ego_ms: 10.0,
            v_target_future_ms: 10.0,
            v_pid_ms: 10.0,
            output_gb: 0.1,
            ..Default::default()
        }
    }

    #[test]
    fn test_inactive_is_always_off() {
        let inputs = TransInputs {
            active: false,
            stop_requested: true,
            ..cruising()
        };

        for mode in ALL_MODES.iter() {
            assert_eq!(next_mode(*mode, &inputs), LongCtrlMode::Off);
        }
    }

    #[test]
    fn test_off_engages_to_tracking() {
        // Even with every stopping condition met, Off goes to Tracking first
        let inputs = TransInputs {
            v_ego_ms: 0.0,
            v_target_future_ms: 0.0,
            v_pid_ms: 0.0,
            stop_requested: true,
            ..cruising()
        };
        assert_eq!(next_mode(LongCtrlMode::Off, &inputs), LongCtrlMode::Tracking);
    }

    #[test]
    fn test_stopping_condition() {
        assert!(!cruising().stopping_condition());

        // Requested stop wins at any speed
        assert!(TransInputs { stop_requested: true, ..cruising() }.stopping_condition());

        // Cruise standstill below 2 m/s
        let standstill = TransInputs { cruise_standstill: true, v_ego_ms: 1.9, ..cruising() };
        assert!(standstill.stopping_condition());
        assert!(!TransInputs { v_ego_ms: 2.0, ..standstill }.stopping_condition());

        // Low speed with low targets
        let slow = TransInputs {
            v_ego_ms: 0.4,
            v_pid_ms: 0.3,
            v_target_future_ms: 0.3,
            ..cruising()
        };
        assert!(slow.stopping_condition());
        assert!(!TransInputs { v_target_future_ms: 0.32, ..slow }.stopping_condition());
        assert!(!TransInputs { v_pid_ms: 0.32, ..slow }.stopping_condition());
        assert!(!TransInputs { v_ego_ms: 0.5, ..slow }.stopping_condition());

        // Low speed with the brake pressed
        let braking = TransInputs { v_ego_ms: 0.4, brake_pressed: true, ..cruising() };
        assert!(braking.stopping_condition());
    }

    #[test]
    fn test_starting_condition() {
        let inputs = TransInputs { v_target_future_ms: 0.51, ..cruising() };
        assert!(inputs.starting_condition());
        assert!(!TransInputs { v_target_future_ms: 0.5, ..inputs }.starting_condition());
        assert!(!TransInputs { cruise_standstill: true, ..inputs }.starting_condition());
    }

    #[test]
    fn test_transition_table() {
        use LongCtrlMode::*;

        let stop = TransInputs { stop_requested: true, ..cruising() };
        let start = TransInputs {
            v_target_future_ms: 1.0,
            output_gb: -0.5,
            ..cruising()
        };

        assert_eq!(next_mode(Tracking, &cruising()), Tracking);
        assert_eq!(next_mode(Tracking, &stop), Stopping);

        assert_eq!(next_mode(Stopping, &TransInputs { v_target_future_ms: 0.0, ..stop }), Stopping);
        assert_eq!(next_mode(Stopping, &TransInputs { v_target_future_ms: 0.0, ..cruising() }), Stopping);
        assert_eq!(next_mode(Stopping, &start), Starting);

        assert_eq!(next_mode(Starting, &start), Starting);
        assert_eq!(next_mode(Starting, &TransInputs { output_gb: -0.2, ..start }), Tracking);
        assert_eq!(next_mode(Starting, &TransInputs { output_gb: 0.0, ..start }), Tracking);
        assert_eq!(
            next_mode(Starting, &TransInputs { stop_requested: true, output_gb: 0.0, ..start }),
            Stopping
        );
    }

    #[test]
    fn test_stop_request_does_not_hold_stopping() {
        let stop = TransInputs { stop_requested: true, ..cruising() };

        assert!(stop.starting_condition());
        assert_eq!(next_mode(LongCtrlMode::Stopping, &stop), LongCtrlMode::Starting);
        assert_eq!(next_mode(LongCtrlMode::Starting, &stop), LongCtrlMode::Stopping);
    }

    #[test]
    fn test_deterministic() {
        let cases = [
            cruising(),
            TransInputs { stop_requested: true, ..cruising() },
            TransInputs { v_ego_ms: 0.0, v_pid_ms: 0.0, v_target_future_ms: 0.0, ..cruising() },
            TransInputs { v_target_future_ms: 1.0, output_gb: -0.6, ..cruising() },
            TransInputs { active: false, ..cruising() }
        ];

        for mode in ALL_MODES.iter() {
            for inputs in cases.iter() {
                let first = next_mode(*mode, inputs);
                for _ in 0..10 {
                    assert_eq!(next_mode(*mode, inputs), first);
                }
            }
        }
    }
}
