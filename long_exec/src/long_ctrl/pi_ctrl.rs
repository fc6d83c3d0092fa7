//! # Speed PI controller
//!
//! A proportional-integral controller with speed scheduled gains, a feedforward term, an error
//! deadzone and output saturation. The integrator only moves when doing so cannot wind it up
//! past the reachable output, and can be frozen by the caller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use util::curve::Curve;

// Internal
use super::{GainSchedule, RATE_HZ};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Integration step per cycle.
const I_RATE: f64 = 1.0 / RATE_HZ;

/// Step of the saturation counter per cycle.
const SAT_COUNT_RATE: f64 = 1.0 / RATE_HZ;

/// Errors smaller than this don't count towards saturation.
const SAT_MIN_ERROR: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PI controller
#[derive(Debug, Clone, Serialize)]
pub struct PiController {
    /// Proportional gain against speed
    #[serde(skip)]
    kp: Curve,

    /// Integral gain against speed
    #[serde(skip)]
    ki: Curve,

    /// Feedforward gain
    k_f: f64,

    /// Which gains are in use
    schedule: GainSchedule,

    /// Upper output limit
    pos_limit: f64,

    /// Lower output limit
    neg_limit: f64,

    /// Proportional term of the last update
    p: f64,

    /// The integral accumulation
    i: f64,

    /// Feedforward term of the last update
    f: f64,

    /// Saturated output of the last update
    control: f64,

    /// Saturation counter, between 0 and 1
    sat_count: f64,

    /// Counter value above which the controller is considered saturated
    sat_limit: f64,

    /// True if the output has been saturated for longer than the saturation limit
    saturated: bool,

    /// Optional conversion of the raw control, given the control and the speed
    #[serde(skip)]
    convert: Option<fn(f64, f64) -> f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PiController {

    /// Create a new controller with the given gain schedules.
    ///
    /// The output is unlimited until `set_limits` is called.
    pub fn new(kp: Curve, ki: Curve, k_f: f64, sat_limit: f64) -> Self {
        Self {
            kp,
            ki,
            k_f,
            schedule: GainSchedule::Baseline,
            pos_limit: f64::INFINITY,
            neg_limit: f64::NEG_INFINITY,
            p: 0.0,
            i: 0.0,
            f: 0.0,
            control: 0.0,
            sat_count: 0.0,
            sat_limit,
            saturated: false,
            convert: None
        }
    }

    /// Apply a conversion to the raw control before it is saturated, for example to map an
    /// acceleration demand into pedal travel. `None` removes the conversion.
    pub fn set_convert(&mut self, convert: Option<fn(f64, f64) -> f64>) {
        self.convert = convert;
    }

    /// Clear the integrator and saturation state. Limits and gains are kept.
    pub fn reset(&mut self) {
        self.p = 0.0;
        self.i = 0.0;
        self.f = 0.0;
        self.control = 0.0;
        self.sat_count = 0.0;
        self.saturated = false;
    }

    /// Set the output limits.
    pub fn set_limits(&mut self, pos_limit: f64, neg_limit: f64) {
        self.pos_limit = pos_limit;
        self.neg_limit = neg_limit;
    }

    /// Replace the configured gain schedules.
    pub fn set_gain_curves(&mut self, kp: Curve, ki: Curve) {
        self.kp = kp;
        self.ki = ki;
    }

    /// Select which gains are used.
    pub fn set_schedule(&mut self, schedule: GainSchedule) {
        self.schedule = schedule;
    }

    /// Zero the integrator only.
    pub fn clear_integrator(&mut self) {
        self.i = 0.0;
    }

    /// Proportional gain at the given speed.
    pub fn k_p(&self, speed: f64) -> f64 {
        match self.schedule {
            GainSchedule::Baseline => self.kp.interp(speed),
            GainSchedule::Suppressed => 0.0
        }
    }

    /// Integral gain at the given speed.
    pub fn k_i(&self, speed: f64) -> f64 {
        match self.schedule {
            GainSchedule::Baseline => self.ki.interp(speed),
            GainSchedule::Suppressed => 0.0
        }
    }

    /// Get the output of the controller for this cycle.
    ///
    /// - `setpoint` and `measurement` give the error.
    /// - `speed` selects the gains from the schedules.
    /// - `feedforward` is added to the output after scaling by the feedforward gain.
    /// - `deadzone` is the half-width of the error band which is treated as zero error.
    /// - `freeze_integrator` holds the integrator at its current value.
    pub fn update(
        &mut self,
        setpoint: f64,
        measurement: f64,
        speed: f64,
        feedforward: f64,
        deadzone: f64,
        freeze_integrator: bool
    ) -> f64 {
        let error = apply_deadzone(setpoint - measurement, deadzone);

        self.p = error * self.k_p(speed);
        self.f = feedforward * self.k_f;

        // Candidate integrator. It is only accepted if it moves the control away from the limit it
        // is already at, or moves in the direction of the error while within limits.
        let i = self.i + error * self.k_i(speed) * I_RATE;
        let control = self.apply_convert(self.p + self.f + i, speed);

        let within_limits =
            (error >= 0.0 && (control <= self.pos_limit || i < 0.0))
            || (error <= 0.0 && (control >= self.neg_limit || i > 0.0));

        if within_limits && !freeze_integrator {
            self.i = i;
        }

        let control = self.apply_convert(self.p + self.f + self.i, speed);

        self.saturated = self.check_saturation(control, error);

        self.control = control.max(self.neg_limit).min(self.pos_limit);
        self.control
    }

    /// The integral accumulation.
    pub fn integrator(&self) -> f64 {
        self.i
    }

    /// The output of the last update.
    pub fn control(&self) -> f64 {
        self.control
    }

    /// True if the output has been saturated for a sustained period.
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// The gain schedule in use.
    pub fn schedule(&self) -> GainSchedule {
        self.schedule
    }

    /// The output conversion, if any.
    pub fn convert(&self) -> Option<fn(f64, f64) -> f64> {
        self.convert
    }

    fn apply_convert(&self, control: f64, speed: f64) -> f64 {
        match self.convert {
            Some(c) => c(control, speed),
            None => control
        }
    }

    fn check_saturation(&mut self, control: f64, error: f64) -> bool {
        let saturated = control < self.neg_limit || control > self.pos_limit;

        if saturated && error.abs() > SAT_MIN_ERROR {
            self.sat_count += SAT_COUNT_RATE;
        }
        else {
            self.sat_count -= SAT_COUNT_RATE;
        }

        self.sat_count = self.sat_count.max(0.0).min(1.0);

        self.sat_count > self.sat_limit
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Remove a band of `deadzone` either side of zero from the error.
///
/// Errors inside the band become zero, errors outside it are moved towards zero by the band
/// width so the output has no step at the band edge.
pub fn apply_deadzone(error: f64, deadzone: f64) -> f64 {
    if error > deadzone {
        error - deadzone
    }
    else if error < -deadzone {
        error + deadzone
    }
    else {
        0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pi(kp: f64, ki: f64) -> PiController {
        PiController::new(Curve::constant(kp), Curve::constant(ki), 1.0, 0.8)
    }

    #[test]
    fn test_apply_deadzone() {
        assert_eq!(apply_deadzone(0.2, 0.5), 0.0);
        assert_eq!(apply_deadzone(-0.5, 0.5), 0.0);
        assert_eq!(apply_deadzone(1.0, 0.5), 0.5);
        assert_eq!(apply_deadzone(-1.0, 0.5), -0.5);
        assert_eq!(apply_deadzone(-1.0, 0.0), -1.0);
    }

    #[test]
    fn test_proportional_only() {
        let mut c = pi(2.0, 0.0);
        c.set_limits(10.0, -10.0);

        assert!((c.update(1.0, 0.5, 0.5, 0.0, 0.0, false) - 1.0).abs() < 1e-12);
        assert!((c.update(0.0, 0.5, 0.5, 0.0, 0.0, false) + 1.0).abs() < 1e-12);
        assert_eq!(c.integrator(), 0.0);
    }

    #[test]
    fn test_gains_are_speed_scheduled() {
        let mut c = PiController::new(
            Curve::new(vec![0.0, 10.0], vec![2.0, 1.0]).unwrap(),
            Curve::constant(0.0),
            1.0, 0.8
        );
        c.set_limits(10.0, -10.0);

        let out = c.update(6.0, 5.0, 5.0, 0.0, 0.0, false);
        assert!((out - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_feedforward_and_limits() {
        let mut c = pi(0.0, 0.0);
        c.set_limits(0.5, -1.0);

        assert!((c.update(0.0, 0.0, 0.0, 0.3, 0.0, false) - 0.3).abs() < 1e-12);
        assert_eq!(c.update(0.0, 0.0, 0.0, 2.0, 0.0, false), 0.5);
        assert_eq!(c.update(0.0, 0.0, 0.0, -2.0, 0.0, false), -1.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut c = pi(0.0, 1.0);
        c.set_limits(10.0, -10.0);

        // Constant unit error for one second
        let mut out = 0.0;
        for _ in 0..100 {
            out = c.update(1.0, 0.0, 0.0, 0.0, 0.0, false);
        }

        assert!((c.integrator() - 1.0).abs() < 1e-9);
        assert!((out - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_freeze_integrator() {
        let mut c = pi(0.0, 1.0);
        c.set_limits(10.0, -10.0);

        for _ in 0..10 {
            c.update(1.0, 0.0, 0.0, 0.0, 0.0, false);
        }
        let held = c.integrator();

        for _ in 0..10 {
            c.update(1.0, 0.0, 0.0, 0.0, 0.0, true);
        }
        assert_eq!(c.integrator(), held);
    }

    #[test]
    fn test_deadzone_stops_integration() {
        let mut c = pi(1.0, 1.0);
        c.set_limits(10.0, -10.0);

        for _ in 0..50 {
            let out = c.update(1.2, 1.0, 1.0, 0.0, 0.5, false);
            assert_eq!(out, 0.0);
        }
        assert_eq!(c.integrator(), 0.0);
    }

    #[test]
    fn test_anti_windup() {
        let mut c = pi(0.0, 10.0);
        c.set_limits(0.5, -0.5);

        for _ in 0..500 {
            c.update(1.0, 0.0, 0.0, 0.0, 0.0, false);
            assert!(c.integrator() <= 0.5 + 1e-12);
        }
        let held = c.control();
        assert!(held > 0.39 && held <= 0.5);

        // Reversing the error must pull the output down straight away, which it could not do if
        // the integrator had wound up.
        let out = c.update(0.0, 1.0, 0.0, 0.0, 0.0, false);
        assert!(out < held);
    }

    #[test]
    fn test_suppressed_gains_leave_feedforward() {
        let mut c = pi(5.0, 1.0);
        c.set_limits(100.0, -100.0);

        for _ in 0..10 {
            c.update(2.0, 0.0, 0.0, 0.0, 0.0, false);
        }
        let i = c.integrator();
        assert!(i > 0.0);

        c.set_schedule(GainSchedule::Suppressed);
        let out = c.update(2.0, 0.0, 0.0, -0.4, 0.0, false);

        assert_eq!(c.integrator(), i);
        assert!((out - (i - 0.4)).abs() < 1e-12);

        c.clear_integrator();
        let out = c.update(2.0, 0.0, 0.0, -0.4, 0.0, false);
        assert!((out + 0.4).abs() < 1e-12);

        // Baseline gains come back unchanged
        c.set_schedule(GainSchedule::Baseline);
        assert_eq!(c.k_p(0.0), 5.0);
        assert_eq!(c.k_i(0.0), 1.0);
    }

    #[test]
    fn test_saturation_flag() {
        let mut c = pi(10.0, 0.0);
        c.set_limits(0.5, -0.5);

        for _ in 0..10 {
            c.update(1.0, 0.0, 0.0, 0.0, 0.0, false);
        }
        assert!(!c.saturated());

        for _ in 0..90 {
            c.update(1.0, 0.0, 0.0, 0.0, 0.0, false);
        }
        assert!(c.saturated());

        // Back within limits the counter drains
        for _ in 0..100 {
            c.update(0.0, 0.0, 0.0, 0.0, 0.0, false);
        }
        assert!(!c.saturated());
    }

    #[test]
    fn test_reset_keeps_limits() {
        let mut c = pi(0.0, 1.0);
        c.set_limits(0.2, -0.2);

        for _ in 0..10 {
            c.update(1.0, 0.0, 0.0, 0.0, 0.0, false);
        }
        c.reset();

        assert_eq!(c.integrator(), 0.0);
        assert_eq!(c.control(), 0.0);
        assert_eq!(c.update(0.0, 0.0, 0.0, 1.0, 0.0, false), 0.2);
    }

    #[test]
    fn test_convert() {
        fn halve(control: f64, _speed: f64) -> f64 {
            control * 0.5
        }

        let mut c = pi(1.0, 0.0);
        c.set_convert(Some(halve));
        c.set_limits(10.0, -10.0);

        assert!((c.update(2.0, 0.0, 0.0, 0.0, 0.0, false) - 1.0).abs() < 1e-12);

        // Limits apply to the converted output
        c.set_limits(0.4, -10.0);
        assert_eq!(c.update(2.0, 0.0, 0.0, 0.0, 0.0, false), 0.4);

        c.set_convert(None);
        c.set_limits(10.0, -10.0);
        assert!((c.update(2.0, 0.0, 0.0, 0.0, 0.0, false) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_set_gain_curves() {
        let mut c = pi(1.0, 0.0);
        c.set_limits(100.0, -100.0);

        c.set_gain_curves(
            Curve::new(vec![0.0, 10.0], vec![4.0, 2.0]).unwrap(),
            Curve::constant(0.5)
        );
        assert_eq!(c.k_p(10.0), 2.0);
        assert_eq!(c.k_i(3.0), 0.5);

        let out = c.update(1.0, 0.0, 10.0, 0.0, 0.0, false);
        assert!((out - (2.0 + 0.5 / RATE_HZ)).abs() < 1e-12);

        // Suppressing and restoring brings back the replaced curves, not the original ones
        c.set_schedule(GainSchedule::Suppressed);
        assert_eq!(c.k_p(10.0), 0.0);
        assert_eq!(c.k_i(10.0), 0.0);

        c.set_schedule(GainSchedule::Baseline);
        assert_eq!(c.k_p(0.0), 4.0);
        assert_eq!(c.k_p(10.0), 2.0);
        assert_eq!(c.k_i(10.0), 0.5);
    }
}
