//! Dynamic gas collaborator interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{LeadSnapshot, TrackSnapshot};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Sets the gas ceiling from the traffic ahead.
///
/// When installed and enabled in the parameters, the value returned replaces the speed scheduled
/// gas ceiling for the cycle. Implementations are called once per cycle and must not block.
pub trait GasLimiter {
    /// Get the gas ceiling for this cycle.
    ///
    /// - `v_ego_ms`: ego speed in meters/second.
    /// - `lead`: the lead vehicle this cycle.
    /// - `tracks`: the other tracks this cycle.
    /// - `time_headway_s`: the following time headway in use.
    /// - `blinker_on`: either turn signal is on.
    fn update(
        &mut self,
        v_ego_ms: f64,
        lead: &LeadSnapshot,
        tracks: &TrackSnapshot,
        time_headway_s: f64,
        blinker_on: bool
    ) -> f64;
}
